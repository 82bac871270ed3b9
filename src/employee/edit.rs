//! Employee editing page and endpoint.

use std::str::FromStr;

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    auth::{PasswordHash, ValidatedPassword},
    employee::{
        Employee, EmployeeId, EmployeeName, Role,
        create::{EmployeeEndpointState, employee_fields},
        db::update_employee,
        domain::EmployeeFormData,
        get_employee, require_role, update_employee_password,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, password_input, submit_button},
    navigation::NavBar,
};

/// Render the page for editing an employee.
pub async fn get_edit_employee_page(
    Path(target_id): Path<i64>,
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_employees, &connection)?;

    let employee = get_employee(EmployeeId::new(target_id), &connection)?;

    Ok(edit_employee_view(&employee).into_response())
}

/// Handle the form for editing an employee.
///
/// An empty password leaves the current password unchanged.
pub async fn update_employee_endpoint(
    Path(target_id): Path<i64>,
    State(state): State<EmployeeEndpointState>,
    Extension(employee_id): Extension<EmployeeId>,
    Form(form): Form<EmployeeFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = require_role(employee_id, Role::can_manage_employees, &connection) {
        return error.into_alert_response();
    }

    let target_id = EmployeeId::new(target_id);

    let name = match EmployeeName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let role = match Role::from_str(&form.role) {
        Ok(role) => role,
        Err(error) => return error.into_alert_response(),
    };

    let password_hash = if form.password.is_empty() {
        None
    } else {
        match ValidatedPassword::new(&form.password, &[name.as_ref()])
            .and_then(|password| PasswordHash::new(password, state.password_hash_cost))
        {
            Ok(password_hash) => Some(password_hash),
            Err(error) => return error.into_alert_response(),
        }
    };

    let result = update_employee(target_id, &name, role, &connection).and_then(|_| {
        match password_hash {
            Some(password_hash) => update_employee_password(target_id, &password_hash, &connection),
            None => Ok(()),
        }
    });

    match result {
        Ok(_) => (
            HxRedirect(endpoints::EMPLOYEES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update employee {target_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_employee_view(employee: &Employee) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_EMPLOYEE_VIEW, employee.id.as_i64());
    let update_url = endpoints::format_endpoint(endpoints::PUT_EMPLOYEE, employee.id.as_i64());
    let nav_bar = NavBar::new(&edit_url).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Edit Employee" }

                (employee_fields(employee.name.as_ref(), employee.role))

                (password_input("New password (leave blank to keep)", false, 0, None))

                (submit_button("Save"))
            }
        }
    };

    base("Edit Employee", &[], &content)
}

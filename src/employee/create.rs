//! Employee creation page and endpoint.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::DbState,
    auth::{PasswordHash, ValidatedPassword},
    employee::{
        EmployeeId, EmployeeName, Role, create_employee, domain::EmployeeFormData, require_role,
    },
    endpoints,
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, password_input,
        submit_button,
    },
    navigation::NavBar,
};

/// The state needed for creating and editing employees.
#[derive(Debug, Clone)]
pub struct EmployeeEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing a new password.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for EmployeeEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// Render the page for adding an employee.
pub async fn get_new_employee_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_employees, &connection)?;

    Ok(new_employee_view().into_response())
}

/// Handle the form for adding an employee.
pub async fn create_employee_endpoint(
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

    let name = match EmployeeName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let role = match Role::from_str(&form.role) {
        Ok(role) => role,
        Err(error) => return error.into_alert_response(),
    };

    let password_hash = match ValidatedPassword::new(&form.password, &[name.as_ref()])
        .and_then(|password| PasswordHash::new(password, state.password_hash_cost))
    {
        Ok(password_hash) => password_hash,
        Err(error) => return error.into_alert_response(),
    };

    match create_employee(name, role, password_hash, &connection) {
        Ok(employee) => {
            tracing::info!("created employee {} with role {}", employee.id, employee.role);

            (
                HxRedirect(endpoints::EMPLOYEES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create employee: {error}");
            error.into_alert_response()
        }
    }
}

fn new_employee_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EMPLOYEE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::POST_EMPLOYEE)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Add Employee" }

                (employee_fields("", Role::Washer))

                (password_input("Password", true, 8, None))

                (submit_button("Add Employee"))
            }
        }
    };

    base("Add Employee", &[], &content)
}

/// The name input and role select shared by the create and edit forms.
pub(super) fn employee_fields(name: &str, role: Role) -> Markup {
    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                value=(name)
                placeholder="Name"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="role" class=(FORM_LABEL_STYLE) { "Role" }

            select id="role" name="role" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for option in Role::ALL {
                    option value=(option.as_str()) selected[option == role] { (option.label()) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};

    use crate::{
        app_state::DbState,
        employee::{
            Role, create_employee_endpoint, domain::EmployeeFormData, get_all_employees,
            get_employee_by_name, get_new_employee_page,
        },
        endpoints,
        test_utils::{
            assert_form_input, assert_form_select, assert_form_submit_button, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, must_create_employee, must_get_form,
            open_test_db, parse_html_document,
        },
    };

    use super::EmployeeEndpointState;

    fn get_state() -> (EmployeeEndpointState, crate::employee::EmployeeId) {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);

        let state = EmployeeEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
            password_hash_cost: 4,
        };

        (state, admin.id)
    }

    #[tokio::test]
    async fn render_page() {
        let (state, admin_id) = get_state();
        let state = DbState {
            db_connection: state.db_connection,
        };

        let response = get_new_employee_page(State(state), Extension(admin_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EMPLOYEE, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "password", "password");
        assert_eq!(
            assert_form_select(&form, "role"),
            vec!["admin", "manager", "washer"]
        );
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn can_create_employee() {
        let (state, admin_id) = get_state();
        let form = EmployeeFormData {
            name: "Aroha".to_owned(),
            role: "washer".to_owned(),
            password: "rinse-and-repeat-every-day".to_owned(),
        };

        let response =
            create_employee_endpoint(State(state.clone()), Extension(admin_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EMPLOYEES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let employee = get_employee_by_name("Aroha", &connection).unwrap();
        assert_eq!(employee.role, Role::Washer);
        assert!(
            employee
                .password_hash
                .verify("rinse-and-repeat-every-day")
                .unwrap()
        );
    }

    #[tokio::test]
    async fn weak_password_is_rejected() {
        let (state, admin_id) = get_state();
        let form = EmployeeFormData {
            name: "Aroha".to_owned(),
            role: "washer".to_owned(),
            password: "password".to_owned(),
        };

        let response =
            create_employee_endpoint(State(state.clone()), Extension(admin_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_employees(&connection).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let (state, admin_id) = get_state();
        let form = EmployeeFormData {
            name: "Aroha".to_owned(),
            role: "owner".to_owned(),
            password: "rinse-and-repeat-every-day".to_owned(),
        };

        let response = create_employee_endpoint(State(state), Extension(admin_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn manager_cannot_create_employee() {
        let (state, _) = get_state();
        let manager_id = {
            let connection = state.db_connection.lock().unwrap();
            must_create_employee("Mere", Role::Manager, &connection).id
        };
        let form = EmployeeFormData {
            name: "Aroha".to_owned(),
            role: "admin".to_owned(),
            password: "rinse-and-repeat-every-day".to_owned(),
        };

        let response =
            create_employee_endpoint(State(state), Extension(manager_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

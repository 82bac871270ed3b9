//! Service creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    employee::{EmployeeId, Role, require_role},
    endpoints,
    html::{
        FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input, dollar_input_styles, submit_button,
    },
    navigation::NavBar,
    service::{Service, create_service, domain::ServiceFormData},
};

/// Render the page for adding a service to the catalog.
pub async fn get_new_service_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_catalog, &connection)?;

    Ok(new_service_view().into_response())
}

/// Handle the form for adding a service.
pub async fn create_service_endpoint(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
    Form(form): Form<ServiceFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = require_role(employee_id, Role::can_manage_catalog, &connection) {
        return error.into_alert_response();
    }

    match create_service(form.into(), &connection) {
        Ok(service) => {
            tracing::info!("created service {} \"{}\"", service.id, service.name);

            (
                HxRedirect(endpoints::SERVICES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create service: {error}");
            error.into_alert_response()
        }
    }
}

fn new_service_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_SERVICE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::POST_SERVICE)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Add Service" }

                (service_fields(None))

                (submit_button("Add Service"))
            }
        }
    };

    base("Add Service", &[dollar_input_styles()], &content)
}

/// The inputs shared by the create and edit forms, prefilled from `service`.
pub(super) fn service_fields(service: Option<&Service>) -> Markup {
    let name = service.map(|service| service.name.as_str()).unwrap_or_default();
    let active = service.is_none_or(|service| service.active);

    html! {
        div
        {
            label for="name" class=(FORM_LABEL_STYLE) { "Name" }

            input
                id="name"
                type="text"
                name="name"
                value=(name)
                placeholder="e.g. Express Wash"
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        (dollar_input("price", "Price", service.map(|service| service.price), true))

        (dollar_input(
            "commission",
            "Commission",
            service.map(|service| service.commission),
            true,
        ))

        div class="flex items-center gap-2"
        {
            input
                id="active"
                type="checkbox"
                name="active"
                value="on"
                checked[active]
                class=(FORM_CHECKBOX_STYLE);

            label for="active" class=(FORM_LABEL_STYLE) { "Available for sale" }
        }
    }
}

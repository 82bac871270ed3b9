//! Service editing page and endpoint.

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
    employee::{EmployeeId, Role, require_role},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles, submit_button},
    navigation::NavBar,
    service::{
        Service, ServiceId, create::service_fields, db::update_service, domain::ServiceFormData,
        get_service,
    },
};

/// Render the page for editing a service.
pub async fn get_edit_service_page(
    Path(service_id): Path<ServiceId>,
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_catalog, &connection)?;

    let service = get_service(service_id, &connection)?;

    Ok(edit_service_view(&service).into_response())
}

/// Handle the form for editing a service.
pub async fn update_service_endpoint(
    Path(service_id): Path<ServiceId>,
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

    match update_service(service_id, form.into(), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::SERVICES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update service {service_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_service_view(service: &Service) -> Markup {
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_SERVICE_VIEW, service.id);
    let update_url = endpoints::format_endpoint(endpoints::PUT_SERVICE, service.id);
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
                h1 class="text-xl font-bold" { "Edit Service" }

                (service_fields(Some(service)))

                (submit_button("Save"))
            }
        }
    };

    base("Edit Service", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        app_state::DbState,
        employee::{EmployeeId, Role},
        endpoints,
        service::{
            Service, domain::ServiceFormData, get_edit_service_page, get_service,
            update_service_endpoint,
        },
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_create_employee, must_create_service, must_get_form,
            open_test_db, parse_html_document,
        },
    };

    fn get_state() -> (DbState, EmployeeId, Service) {
        let connection = open_test_db();
        let manager = must_create_employee("Mere", Role::Manager, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);

        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, manager.id, service)
    }

    #[tokio::test]
    async fn page_is_prefilled() {
        let (state, manager_id, service) = get_state();

        let response =
            get_edit_service_page(Path(service.id), State(state), Extension(manager_id))
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_SERVICE, service.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Express Wash");
        assert_form_input_with_value(&form, "price", "number", "25.00");
        assert_form_input_with_value(&form, "commission", "number", "8.00");
    }

    #[tokio::test]
    async fn page_for_missing_service_is_not_found() {
        let (state, manager_id, _) = get_state();

        let result = get_edit_service_page(Path(42), State(state), Extension(manager_id)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[tokio::test]
    async fn can_deactivate_service() {
        let (state, manager_id, service) = get_state();
        let form = ServiceFormData {
            name: "Express Wash".to_owned(),
            price: 30.0,
            commission: 10.0,
            active: None,
        };

        let response = update_service_endpoint(
            Path(service.id),
            State(state.clone()),
            Extension(manager_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::SERVICES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let updated = get_service(service.id, &connection).unwrap();
        assert_eq!(updated.price, 30.0);
        assert_eq!(updated.commission, 10.0);
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn updating_missing_service_is_not_found() {
        let (state, manager_id, _) = get_state();
        let form = ServiceFormData {
            name: "Ghost".to_owned(),
            price: 1.0,
            commission: 0.0,
            active: None,
        };

        let response =
            update_service_endpoint(Path(42), State(state), Extension(manager_id), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

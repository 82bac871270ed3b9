//! Customer creation page and endpoint.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    customer::{create_customer, domain::CustomerFormData},
    endpoints,
    html::{FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, submit_button},
    navigation::NavBar,
};

/// Render the page for adding a customer.
pub async fn get_new_customer_page() -> Response {
    new_customer_view().into_response()
}

/// Handle the form for adding a customer and go to their page.
pub async fn create_customer_endpoint(
    State(state): State<DbState>,
    Form(form): Form<CustomerFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_customer(form.into(), &connection) {
        Ok(customer) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::CUSTOMER_VIEW,
                customer.id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create customer: {error}");
            error.into_alert_response()
        }
    }
}

fn new_customer_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CUSTOMER_VIEW).into_html();

    let text_input = |name: &str, label: &str, type_: &str, required: bool| {
        html! {
            div
            {
                label for=(name) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(name)
                    type=(type_)
                    name=(name)
                    required[required]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::POST_CUSTOMER)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Add Customer" }

                (text_input("name", "Name", "text", true))
                (text_input("phone", "Phone", "tel", false))
                (text_input("email", "Email", "email", false))

                div
                {
                    label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                    textarea id="notes" name="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE) {}
                }

                (submit_button("Add Customer"))
            }
        }
    };

    base("Add Customer", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};

    use crate::{
        app_state::DbState,
        customer::{
            create_customer_endpoint, domain::CustomerFormData, get_all_customers,
            get_new_customer_page,
        },
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, open_test_db, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_customer_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CUSTOMER, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn create_redirects_to_customer_page() {
        let state = DbState {
            db_connection: Arc::new(Mutex::new(open_test_db())),
        };
        let form = CustomerFormData {
            name: "Jane Doe".to_owned(),
            phone: "021 555 0101".to_owned(),
            email: String::new(),
            notes: "Prefers hand dry".to_owned(),
        };

        let response = create_customer_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let connection = state.db_connection.lock().unwrap();
        let customers = get_all_customers(&connection).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].notes, "Prefers hand dry");
        assert_hx_redirect(
            &response,
            &endpoints::format_endpoint(endpoints::CUSTOMER_VIEW, customers[0].id),
        );
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let state = DbState {
            db_connection: Arc::new(Mutex::new(open_test_db())),
        };
        let form = CustomerFormData {
            name: " ".to_owned(),
            phone: String::new(),
            email: String::new(),
            notes: String::new(),
        };

        let response = create_customer_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

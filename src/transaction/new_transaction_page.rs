//! The point-of-sale page for recording a sale.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    app_state::DbTimezoneState,
    customer::{Customer, get_all_customers},
    employee::{Employee, EmployeeId, get_all_employees},
    endpoints,
    html::{
        FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_STYLE, base, dollar_input, dollar_input_styles,
        submit_button,
    },
    navigation::NavBar,
    service::{Service, get_active_services},
    timezone::local_today,
};

/// How many blank rows the extras table offers.
const EXTRA_ROWS: usize = 3;

/// Renders the page for recording a sale.
///
/// The employee using the page is ticked as working on the sale by default.
pub async fn get_new_transaction_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customers = get_all_customers(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve customers: {error}"))?;
    let services = get_active_services(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve services: {error}"))?;
    let employees = get_all_employees(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve employees: {error}"))?;

    Ok(new_transaction_view(&customers, &services, &employees, employee_id, today).into_response())
}

fn new_transaction_view(
    customers: &[Customer],
    services: &[Service],
    employees: &[Employee],
    current_employee: EmployeeId,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let extra_row = || {
        html! {
            tr
            {
                td class="py-1 pr-2"
                {
                    input
                        type="text"
                        name="extra_description"
                        placeholder="e.g. Tyre shine"
                        aria-label="Extra description"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
                td class="py-1 pr-2"
                {
                    input
                        type="number"
                        name="extra_price"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        aria-label="Extra price"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
                td class="py-1 pr-2"
                {
                    input
                        type="number"
                        name="extra_commission"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        aria-label="Extra commission"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
                td class="py-1"
                {
                    select name="extra_assigned_to" aria-label="Extra done by" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Shared" }

                        @for employee in employees {
                            option value=(employee.id) { (employee.name) }
                        }
                    }
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::POST_TRANSACTION)
                hx-target-error="#alert-container"
                class="w-full max-w-2xl space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Record Sale" }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="date"
                        type="date"
                        name="date"
                        value=(today)
                        max=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="customer_id" class=(FORM_LABEL_STYLE) { "Customer" }

                    select id="customer_id" name="customer_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Walk-in" }

                        @for customer in customers {
                            option value=(customer.id)
                            {
                                (customer.name)

                                @if !customer.phone.is_empty() {
                                    " (" (customer.phone) ")"
                                }
                            }
                        }
                    }
                }

                div
                {
                    label for="service_id" class=(FORM_LABEL_STYLE) { "Service" }

                    select id="service_id" name="service_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for service in services {
                            option value=(service.id) { (service.name) }
                        }
                    }
                }

                (dollar_input("tip", "Tip", None, false))

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Done by" }

                    div class="flex flex-wrap gap-4"
                    {
                        @for employee in employees {
                            @let checkbox_id = format!("employee-{}", employee.id);

                            div class="flex items-center gap-2"
                            {
                                input
                                    id=(checkbox_id)
                                    type="checkbox"
                                    name="employee_id"
                                    value=(employee.id)
                                    checked[employee.id == current_employee]
                                    class=(FORM_CHECKBOX_STYLE);

                                label for=(checkbox_id) { (employee.name) }
                            }
                        }
                    }
                }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Extras" }

                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Commission" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Done by" }
                            }
                        }

                        tbody
                        {
                            @for _ in 0..EXTRA_ROWS {
                                (extra_row())
                            }
                        }
                    }
                }

                (submit_button("Record Sale"))
            }
        }
    };

    base("Record Sale", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        app_state::DbTimezoneState,
        employee::Role,
        endpoints,
        test_utils::{
            assert_form_select, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            count_table_rows, must_create_employee, must_create_service, must_get_form,
            open_test_db, parse_html_document,
        },
        transaction::get_new_transaction_page,
    };

    #[tokio::test]
    async fn renders_form_with_current_employee_ticked() {
        let connection = open_test_db();
        let aroha = must_create_employee("Aroha", Role::Washer, &connection);
        must_create_employee("Tama", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_transaction_page(State(state), Extension(aroha.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_TRANSACTION, "hx-post");
        assert_eq!(assert_form_select(&form, "service_id"), vec![service.id.to_string()]);
        assert_eq!(assert_form_select(&form, "customer_id"), vec![""]);
        assert_form_submit_button(&form);
        assert_eq!(count_table_rows(&html), 3);

        let checked: Vec<_> = form
            .select(&Selector::parse("input[name=employee_id][checked]").unwrap())
            .filter_map(|input| input.value().attr("value"))
            .collect();
        assert_eq!(checked, vec![aroha.id.to_string()]);

        let date_input = form
            .select(&Selector::parse("input[name=date]").unwrap())
            .next()
            .unwrap();
        let today = OffsetDateTime::now_utc().date().to_string();
        assert_eq!(date_input.value().attr("max"), Some(today.as_str()));
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let connection = open_test_db();
        let aroha = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Not/A_Zone".to_owned(),
        };

        let result = get_new_transaction_page(State(state), Extension(aroha.id)).await;

        assert!(result.is_err());
    }
}

//! Customer listing page with search.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    app_state::DbState,
    customer::{
        Customer, CustomerId, Vehicle, db::get_all_vehicles, get_all_customers, search_customers,
    },
    employee::{EmployeeId, get_employee},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base,
        delete_action_button, link,
    },
    navigation::NavBar,
};

/// The search box on the customers page.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerSearchQuery {
    /// A name, phone number or licence plate, or part of one.
    pub q: Option<String>,
}

/// Render the customers matching the search query, or every customer if there
/// is no query.
pub async fn get_customers_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
    Query(query): Query<CustomerSearchQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let can_manage = get_employee(employee_id, &connection)?
        .role
        .can_manage_customers();

    let customers = get_all_customers(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve customers: {error}"))?;
    let vehicles = get_all_vehicles(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve vehicles: {error}"))?;

    let query = query.q.unwrap_or_default();
    let customers = search_customers(customers, &vehicles, &query);

    Ok(customers_view(&customers, &vehicles, &query, can_manage).into_response())
}

fn customers_view(
    customers: &[Customer],
    vehicles: &[Vehicle],
    query: &str,
    can_manage: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();

    let mut plates: HashMap<CustomerId, Vec<&str>> = HashMap::new();
    for vehicle in vehicles {
        plates
            .entry(vehicle.customer_id)
            .or_default()
            .push(&vehicle.plate);
    }

    let table_row = |customer: &Customer| {
        let customer_url = endpoints::format_endpoint(endpoints::CUSTOMER_VIEW, customer.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CUSTOMER, customer.id);
        let confirm_message = format!(
            "Are you sure you want to delete {}? Their vehicles, coupons and memberships will be deleted too.",
            customer.name
        );
        let customer_plates = plates
            .get(&customer.id)
            .map(|plates| plates.join(", "))
            .unwrap_or_default();

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (link(&customer_url, &customer.name)) }
                td class=(TABLE_CELL_STYLE) { (customer.phone) }
                td class=(TABLE_CELL_STYLE) { (customer.email) }
                td class=(TABLE_CELL_STYLE) { (customer_plates) }

                @if can_manage {
                    td class=(TABLE_CELL_STYLE)
                    {
                        (delete_action_button(&delete_url, &confirm_message, "closest tr", "delete"))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Customers" }

                    div class="flex gap-4"
                    {
                        @if can_manage {
                            a href=(endpoints::DUPLICATE_CUSTOMERS_VIEW) class=(LINK_STYLE)
                            {
                                "Find Duplicates"
                            }
                        }

                        a href=(endpoints::NEW_CUSTOMER_VIEW) class=(LINK_STYLE) { "Add Customer" }
                    }
                }

                form method="get" action=(endpoints::CUSTOMERS_VIEW) class="flex gap-4 items-end"
                {
                    input
                        type="search"
                        name="q"
                        value=(query)
                        placeholder="Name, phone or plate"
                        aria-label="Search customers"
                        class=(FORM_TEXT_INPUT_STYLE);

                    div
                    {
                        button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Search" }
                    }
                }

                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Phone" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Vehicles" }

                            @if can_manage {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }
                    }

                    tbody
                    {
                        @for customer in customers {
                            (table_row(customer))
                        }
                    }
                }

                @if customers.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        @if query.is_empty() { "No customers yet." } @else { "No customers match your search." }
                    }
                }
            }
        }
    );

    base("Customers", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use axum_extra::extract::Query;

    use crate::{
        app_state::DbState,
        customer::{CustomerBuilder, VehicleFormData, create_customer, create_vehicle},
        employee::{EmployeeId, Role},
        test_utils::{
            assert_valid_html, count_table_rows, must_create_employee, open_test_db,
            parse_html_document, select_text,
        },
    };

    use super::{CustomerSearchQuery, get_customers_page};

    fn get_state(role: Role) -> (DbState, EmployeeId) {
        let connection = open_test_db();
        let employee = must_create_employee("Mere", role, &connection);

        for (name, phone) in [("Jane Doe", "021 555 0101"), ("Bob Smith", "09 876 5432")] {
            let customer = create_customer(
                CustomerBuilder {
                    name: name.to_owned(),
                    phone: phone.to_owned(),
                    ..Default::default()
                },
                &connection,
            )
            .unwrap();

            create_vehicle(
                customer.id,
                VehicleFormData {
                    make: String::new(),
                    model: String::new(),
                    colour: String::new(),
                    plate: format!("{}1", &name[..3]),
                },
                &connection,
            )
            .unwrap();
        }

        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, employee.id)
    }

    #[tokio::test]
    async fn lists_every_customer_without_query() {
        let (state, employee_id) = get_state(Role::Washer);

        let response = get_customers_page(
            State(state),
            Extension(employee_id),
            Query(CustomerSearchQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count_table_rows(&html), 2);
        assert_eq!(
            select_text(&html, "tbody td:first-child"),
            vec!["Bob Smith", "Jane Doe"]
        );
        assert!(select_text(&html, "button[hx-delete]").is_empty());
    }

    #[tokio::test]
    async fn search_filters_by_name() {
        let (state, employee_id) = get_state(Role::Manager);

        let response = get_customers_page(
            State(state),
            Extension(employee_id),
            Query(CustomerSearchQuery {
                q: Some("jan".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(select_text(&html, "tbody td:first-child"), vec!["Jane Doe"]);
        assert_eq!(select_text(&html, "tbody td:nth-child(4)"), vec!["JAN1"]);
        assert_eq!(select_text(&html, "button[hx-delete]"), vec!["Delete"]);
    }

    #[tokio::test]
    async fn search_filters_by_phone() {
        let (state, employee_id) = get_state(Role::Washer);

        let response = get_customers_page(
            State(state),
            Extension(employee_id),
            Query(CustomerSearchQuery {
                q: Some("876-5432".to_owned()),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(select_text(&html, "tbody td:first-child"), vec!["Bob Smith"]);
    }
}

//! The page listing sales for a date range.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbTimezoneState,
    customer::get_all_customers,
    date_range::{DateRange, DateRangeQuery},
    employee::{EmployeeId, get_all_employees, get_employee},
    endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, date_range_form, delete_action_button, format_currency,
    },
    navigation::NavBar,
    service::get_all_services,
    timezone::local_today,
    transaction::{Transaction, get_transactions_in_range},
};

/// A sale with the names of everything it refers to, ready to display.
struct TransactionRow {
    transaction: Transaction,
    customer: String,
    service: String,
    employees: String,
}

/// Render the sales in the requested date range, defaulting to the current month.
pub async fn get_transactions_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let range = query.resolve(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let can_void = get_employee(employee_id, &connection)?
        .role
        .can_void_records();

    let transactions = get_transactions_in_range(&range, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;

    let customer_names: HashMap<_, _> = get_all_customers(&connection)?
        .into_iter()
        .map(|customer| (customer.id, customer.name))
        .collect();
    let service_names: HashMap<_, _> = get_all_services(&connection)?
        .into_iter()
        .map(|service| (service.id, service.name))
        .collect();
    let employee_names: HashMap<_, _> = get_all_employees(&connection)?
        .into_iter()
        .map(|employee| (employee.id, employee.name.to_string()))
        .collect();

    let rows: Vec<TransactionRow> = transactions
        .into_iter()
        .map(|transaction| {
            let workers: Vec<EmployeeId> = if transaction.assignments.is_empty() {
                transaction.employee_id.into_iter().collect()
            } else {
                transaction.assignments.clone()
            };

            TransactionRow {
                customer: transaction
                    .customer_id
                    .and_then(|id| customer_names.get(&id).cloned())
                    .unwrap_or_else(|| "Walk-in".to_owned()),
                service: transaction
                    .service_id
                    .and_then(|id| service_names.get(&id).cloned())
                    .unwrap_or_default(),
                employees: workers
                    .iter()
                    .filter_map(|id| employee_names.get(id).map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(", "),
                transaction,
            }
        })
        .collect();

    Ok(transactions_view(&rows, &range, can_void).into_response())
}

fn transactions_view(rows: &[TransactionRow], range: &DateRange, can_void: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let total_revenue: f64 = rows.iter().map(|row| row.transaction.revenue()).sum();
    let total_tips: f64 = rows.iter().map(|row| row.transaction.tip).sum();
    let total_commission: f64 = rows
        .iter()
        .map(|row| row.transaction.commission_amount)
        .sum();

    let table_row = |row: &TransactionRow| {
        let transaction = &row.transaction;
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.date) }
                td class=(TABLE_CELL_STYLE) { (row.customer) }
                td class=(TABLE_CELL_STYLE)
                {
                    (row.service)

                    @for extra in &transaction.extras {
                        br;
                        span class="text-xs" { "+ " (extra.description) }
                    }
                }
                td class=(TABLE_CELL_STYLE) { (row.employees) }
                td class="px-6 py-4 text-right" { (format_currency(transaction.revenue())) }
                td class="px-6 py-4 text-right" { (format_currency(transaction.tip)) }
                td class="px-6 py-4 text-right" { (format_currency(transaction.commission_amount)) }

                @if can_void {
                    td class=(TABLE_CELL_STYLE)
                    {
                        (delete_action_button(
                            &delete_url,
                            "Are you sure you want to delete this sale? It will no longer count towards commissions.",
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Sales" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Record Sale" }
                }

                (date_range_form(endpoints::TRANSACTIONS_VIEW, range))

                div class="overflow-x-auto"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Customer" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Service" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Done by" }
                                th scope="col" class="px-6 py-4 text-right" { "Price" }
                                th scope="col" class="px-6 py-4 text-right" { "Tip" }
                                th scope="col" class="px-6 py-4 text-right" { "Commission" }

                                @if can_void {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (table_row(row))
                            }
                        }

                        tfoot class="font-semibold text-gray-900 dark:text-white"
                        {
                            tr
                            {
                                th scope="row" colspan="4" class=(TABLE_CELL_STYLE) { "Total" }
                                td class="px-6 py-4 text-right" { (format_currency(total_revenue)) }
                                td class="px-6 py-4 text-right" { (format_currency(total_tips)) }
                                td class="px-6 py-4 text-right" { (format_currency(total_commission)) }

                                @if can_void {
                                    td class=(TABLE_CELL_STYLE) {}
                                }
                            }
                        }
                    }
                }

                @if rows.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "No sales between " (range.start) " and " (range.end) "."
                    }
                }
            }
        }
    );

    base("Sales", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use axum_extra::extract::Query;
    use time::macros::date;

    use crate::{
        Error,
        app_state::DbTimezoneState,
        customer::{CustomerBuilder, create_customer},
        date_range::DateRangeQuery,
        employee::Role,
        test_utils::{
            assert_valid_html, count_table_rows, must_create_employee, must_create_service,
            must_create_transaction, open_test_db, parse_html_document, select_text,
        },
        transaction::get_transactions_page,
    };

    #[tokio::test]
    async fn lists_sales_in_range_with_totals() {
        let connection = open_test_db();
        let manager = must_create_employee("Mere", Role::Manager, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let customer = create_customer(
            CustomerBuilder {
                name: "Jane".to_owned(),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        must_create_transaction(Some(customer.id), service.id, manager.id, date!(2025 - 01 - 10), &connection);
        must_create_transaction(None, service.id, manager.id, date!(2025 - 01 - 20), &connection);
        must_create_transaction(None, service.id, manager.id, date!(2025 - 02 - 01), &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(manager.id),
            Query(DateRangeQuery {
                start: Some(date!(2025 - 01 - 01)),
                end: Some(date!(2025 - 01 - 31)),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(count_table_rows(&html), 2);
        assert_eq!(
            select_text(&html, "tbody td:nth-child(2)"),
            vec!["Walk-in", "Jane"]
        );
        assert_eq!(
            select_text(&html, "tfoot td:nth-child(2)"),
            vec!["$50.00"]
        );
        assert_eq!(select_text(&html, "button[hx-delete]").len(), 2);
    }

    #[tokio::test]
    async fn washer_cannot_delete_sales() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        must_create_transaction(None, service.id, washer.id, date!(2025 - 01 - 10), &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(
            State(state),
            Extension(washer.id),
            Query(DateRangeQuery {
                start: Some(date!(2025 - 01 - 01)),
                end: Some(date!(2025 - 01 - 31)),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(count_table_rows(&html), 1);
        assert!(select_text(&html, "button[hx-delete]").is_empty());
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_transactions_page(
            State(state),
            Extension(washer.id),
            Query(DateRangeQuery {
                start: Some(date!(2025 - 02 - 01)),
                end: Some(date!(2025 - 01 - 01)),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidDateRange(..))));
    }
}

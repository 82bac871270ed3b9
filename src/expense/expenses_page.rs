//! The page listing expenses for a date range.

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
    date_range::{DateRange, DateRangeQuery},
    employee::{EmployeeId, get_all_employees, get_employee},
    endpoints,
    expense::{Expense, get_expenses_in_range},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, date_range_form, delete_action_button, format_currency,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// Render the expenses in the requested date range.
///
/// Admins and managers see every expense, everyone else only sees their own.
pub async fn get_expenses_page(
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

    let sees_all = get_employee(employee_id, &connection)?
        .role
        .can_void_records();

    let expenses: Vec<Expense> = get_expenses_in_range(&range, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?
        .into_iter()
        .filter(|expense| sees_all || expense.employee_id == Some(employee_id))
        .collect();

    let employee_names: HashMap<_, _> = get_all_employees(&connection)?
        .into_iter()
        .map(|employee| (employee.id, employee.name.to_string()))
        .collect();

    Ok(expenses_view(&expenses, &employee_names, &range, sees_all).into_response())
}

fn expenses_view(
    expenses: &[Expense],
    employee_names: &HashMap<EmployeeId, String>,
    range: &DateRange,
    can_void: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Record Expense" }
                }

                (date_range_form(endpoints::EXPENSES_VIEW, range))

                div class="overflow-x-auto"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Paid by" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }

                                @if can_void {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }
                        }

                        tbody
                        {
                            @for expense in expenses {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (expense.date) }
                                    td class=(TABLE_CELL_STYLE) { (expense.description) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @match expense.employee_id.and_then(|id| employee_names.get(&id)) {
                                            Some(name) => { (name) }
                                            None => { "Business" }
                                        }
                                    }
                                    td class="px-6 py-4 text-right" { (format_currency(expense.amount)) }

                                    @if can_void {
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            (delete_action_button(
                                                &endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
                                                "Are you sure you want to delete this expense?",
                                                "closest tr",
                                                "delete",
                                            ))
                                        }
                                    }
                                }
                            }
                        }

                        tfoot class="font-semibold text-gray-900 dark:text-white"
                        {
                            tr
                            {
                                th scope="row" colspan="3" class=(TABLE_CELL_STYLE) { "Total" }
                                td class="px-6 py-4 text-right" { (format_currency(total)) }

                                @if can_void {
                                    td class=(TABLE_CELL_STYLE) {}
                                }
                            }
                        }
                    }
                }

                @if expenses.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "No expenses between " (range.start) " and " (range.end) "."
                    }
                }
            }
        }
    );

    base("Expenses", &[], &content)
}

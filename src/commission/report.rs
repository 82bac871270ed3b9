//! The commission report page and its CSV export.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    app_state::DbTimezoneState,
    commission::{Attribution, EmployeeSummary, aggregate, attributions_in_range, worker_count},
    date_range::{DateRange, DateRangeQuery},
    employee::{Employee, EmployeeId, get_all_employees, get_employee},
    endpoints,
    expense::get_expenses_in_range,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, date_range_form, format_currency, format_visits,
    },
    navigation::NavBar,
    service::get_all_services,
    timezone::local_today,
    transaction::{Transaction, get_transactions_in_range},
};

/// Query parameters for the commission report.
#[derive(Debug, Default, Deserialize)]
pub struct CommissionQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// The employee whose sales are broken down. Defaults to whoever is asking.
    pub employee_id: Option<i64>,
}

/// The summaries an employee may see for `range`.
///
/// Admins get everyone, anyone else only gets themselves.
struct Report {
    employees: Vec<Employee>,
    summaries: Vec<EmployeeSummary>,
    transactions: Vec<Transaction>,
}

fn build_report(
    current_employee: &Employee,
    range: &DateRange,
    connection: &Connection,
) -> Result<Report, Error> {
    let employees = if current_employee.role.can_view_all_commissions() {
        get_all_employees(connection)?
    } else {
        vec![current_employee.clone()]
    };

    let transactions = get_transactions_in_range(range, connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve transactions: {error}"))?;
    let expenses = get_expenses_in_range(range, connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;

    let summaries = employees
        .iter()
        .map(|employee| aggregate(&transactions, &expenses, employee.id, range))
        .collect();

    Ok(Report {
        employees,
        summaries,
        transactions,
    })
}

/// Render the commission report for a date range, defaulting to the current month.
///
/// # Errors
///
/// Returns [Error::Forbidden] if a non-admin asks for someone else's breakdown.
pub async fn get_commissions_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
    Query(query): Query<CommissionQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let range = DateRangeQuery {
        start: query.start,
        end: query.end,
    }
    .resolve(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let current_employee = get_employee(employee_id, &connection)?;
    let selected_id = query
        .employee_id
        .map(EmployeeId::new)
        .unwrap_or(employee_id);

    if selected_id != employee_id && !current_employee.role.can_view_all_commissions() {
        tracing::warn!("employee {employee_id} tried to view the commissions of {selected_id}");
        return Err(Error::Forbidden);
    }

    let report = build_report(&current_employee, &range, &connection)?;

    let selected = report
        .employees
        .iter()
        .find(|employee| employee.id == selected_id)
        .ok_or(Error::NotFound)?;

    let service_names: HashMap<_, _> = get_all_services(&connection)?
        .into_iter()
        .map(|service| (service.id, service.name))
        .collect();

    let breakdown: Vec<BreakdownRow> =
        attributions_in_range(&report.transactions, selected.id, &range)
            .into_iter()
            .map(|(transaction, attribution)| BreakdownRow {
                date: transaction.date,
                service: transaction
                    .service_id
                    .and_then(|id| service_names.get(&id).cloned())
                    .unwrap_or_default(),
                workers: worker_count(transaction),
                attribution,
            })
            .collect();

    Ok(commissions_view(&report, selected, &breakdown, &range).into_response())
}

/// One sale in the breakdown for the selected employee.
struct BreakdownRow {
    date: Date,
    service: String,
    workers: usize,
    attribution: Attribution,
}

fn commissions_view(
    report: &Report,
    selected: &Employee,
    breakdown: &[BreakdownRow],
    range: &DateRange,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::COMMISSIONS_VIEW).into_html();
    let csv_url = format!("{}?{}", endpoints::COMMISSIONS_CSV, range.to_query_string());
    let show_totals = report.summaries.len() > 1;

    let total = |field: fn(&EmployeeSummary) -> f64| -> f64 {
        report.summaries.iter().map(field).sum()
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Commissions" }

                    a href=(csv_url) class=(LINK_STYLE) download { "Download CSV" }
                }

                (date_range_form(endpoints::COMMISSIONS_VIEW, range))

                div class="overflow-x-auto"
                {
                    table id="summary" class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Employee" }
                                th scope="col" class="px-6 py-4 text-right" { "Visits" }
                                th scope="col" class="px-6 py-4 text-right" { "Commission" }
                                th scope="col" class="px-6 py-4 text-right" { "Tips" }
                                th scope="col" class="px-6 py-4 text-right" { "Expenses" }
                                th scope="col" class="px-6 py-4 text-right" { "Net" }
                            }
                        }

                        tbody
                        {
                            @for (employee, summary) in report.employees.iter().zip(&report.summaries) {
                                @let url = format!(
                                    "{}?{}&employee_id={}",
                                    endpoints::COMMISSIONS_VIEW,
                                    range.to_query_string(),
                                    employee.id
                                );

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        a href=(url) class=(LINK_STYLE) { (employee.name) }
                                    }
                                    td class="px-6 py-4 text-right" { (format_visits(summary.visits)) }
                                    td class="px-6 py-4 text-right" { (format_currency(summary.commission)) }
                                    td class="px-6 py-4 text-right" { (format_currency(summary.tips)) }
                                    td class="px-6 py-4 text-right" { (format_currency(summary.expenses)) }
                                    td class="px-6 py-4 text-right font-semibold" { (format_currency(summary.net)) }
                                }
                            }
                        }

                        @if show_totals {
                            tfoot class="font-semibold text-gray-900 dark:text-white"
                            {
                                tr
                                {
                                    th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                                    td class="px-6 py-4 text-right" { (format_visits(total(|s| s.visits))) }
                                    td class="px-6 py-4 text-right" { (format_currency(total(|s| s.commission))) }
                                    td class="px-6 py-4 text-right" { (format_currency(total(|s| s.tips))) }
                                    td class="px-6 py-4 text-right" { (format_currency(total(|s| s.expenses))) }
                                    td class="px-6 py-4 text-right" { (format_currency(total(|s| s.net))) }
                                }
                            }
                        }
                    }
                }

                h2 class="text-lg font-semibold" { "Sales worked by " (selected.name) }

                div class="overflow-x-auto"
                {
                    table id="breakdown" class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Service" }
                                th scope="col" class="px-6 py-4 text-right" { "Workers" }
                                th scope="col" class="px-6 py-4 text-right" { "Shared" }
                                th scope="col" class="px-6 py-4 text-right" { "Extras" }
                                th scope="col" class="px-6 py-4 text-right" { "Tip" }
                                th scope="col" class="px-6 py-4 text-right" { "Total" }
                            }
                        }

                        tbody
                        {
                            @for row in breakdown {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (row.date) }
                                    td class=(TABLE_CELL_STYLE) { (row.service) }
                                    td class="px-6 py-4 text-right" { (row.workers) }
                                    td class="px-6 py-4 text-right" { (format_currency(row.attribution.base_share)) }
                                    td class="px-6 py-4 text-right" { (format_currency(row.attribution.extras_share)) }
                                    td class="px-6 py-4 text-right" { (format_currency(row.attribution.tip_share)) }
                                    td class="px-6 py-4 text-right" { (format_currency(row.attribution.total)) }
                                }
                            }
                        }
                    }
                }

                @if breakdown.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        (selected.name) " did not work on any sales between "
                        (range.start) " and " (range.end) "."
                    }
                }
            }
        }
    );

    base("Commissions", &[], &content)
}

/// A line of the CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    employee: &'a str,
    start: String,
    end: String,
    visits: f64,
    commission: f64,
    tips: f64,
    expenses: f64,
    net: f64,
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn write_csv(
    employees: &[Employee],
    summaries: &[EmployeeSummary],
    range: &DateRange,
) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for (employee, summary) in employees.iter().zip(summaries) {
        writer
            .serialize(CsvRow {
                employee: employee.name.as_ref(),
                start: range.start.to_string(),
                end: range.end.to_string(),
                visits: round_cents(summary.visits),
                commission: round_cents(summary.commission),
                tips: round_cents(summary.tips),
                expenses: round_cents(summary.expenses),
                net: round_cents(summary.net),
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// Download the commission summaries for a date range as a CSV file.
///
/// Contains the same rows as the summary table on the report page.
pub async fn get_commissions_csv(
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

    let current_employee = get_employee(employee_id, &connection)?;
    let report = build_report(&current_employee, &range, &connection)?;

    let body = write_csv(&report.employees, &report.summaries, &range)
        .inspect_err(|error| tracing::error!("Failed to export commissions: {error}"))?;

    let disposition = format!(
        "attachment; filename=\"commissions-{}-{}.csv\"",
        range.start, range.end
    );

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

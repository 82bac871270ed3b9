//! Dashboard HTTP handler and view rendering.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbTimezoneState,
    commission::{EmployeeSummary, aggregate},
    dashboard::{
        aggregation::{DaySummary, daily_revenue, summarise_day},
        charts::{DashboardChart, charts_script, daily_revenue_chart},
    },
    date_range::DateRange,
    employee::{Employee, EmployeeId, get_employee},
    endpoints,
    expense::get_expenses_in_range,
    html::{HeadElement, base, format_currency, format_visits, link},
    navigation::NavBar,
    timezone::local_today,
    transaction::get_transactions_in_range,
};

/// Number of days shown in the revenue chart, including today.
const CHART_PERIOD_DAYS: i64 = 30;

/// Display a page with today's sales, the employee's earnings this month and
/// revenue for the last thirty days.
pub async fn get_dashboard_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let employee = get_employee(employee_id, &connection)?;

    let chart_range = DateRange::last_days(today, CHART_PERIOD_DAYS);
    let recent_transactions = get_transactions_in_range(&chart_range, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get transactions for the last thirty days: {error}")
        })?;

    let month = DateRange::month_of(today);
    let month_transactions = get_transactions_in_range(&month, &connection)?;
    let month_expenses = get_expenses_in_range(&month, &connection)?;

    let today_summary = summarise_day(&recent_transactions, today);
    let earnings = aggregate(&month_transactions, &month_expenses, employee.id, &month);

    let charts = [DashboardChart {
        id: "daily-revenue-chart",
        options: daily_revenue_chart(&daily_revenue(&recent_transactions, &chart_range))
            .to_string(),
    }];

    Ok(dashboard_view(&employee, &today_summary, &earnings, &charts).into_response())
}

fn stat_card(id: &str, label: &str, value: &str) -> Markup {
    html!(
        div class="p-4 rounded-lg bg-white shadow-sm dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p id=(id) class="text-2xl font-bold" { (value) }
        }
    )
}

fn dashboard_view(
    employee: &Employee,
    today: &DaySummary,
    earnings: &EmployeeSummary,
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold mb-4 w-full" { "Kia ora, " (employee.name) }

            section id="today" class="w-full grid grid-cols-2 lg:grid-cols-4 gap-4 mb-4"
            {
                (stat_card("today-visits", "Cars today", &today.visits.to_string()))
                (stat_card("today-revenue", "Revenue today", &format_currency(today.revenue)))
                (stat_card("today-tips", "Tips today", &format_currency(today.tips)))
                (stat_card("month-earnings", "Your earnings this month", &format_currency(earnings.net)))
            }

            p class="w-full mb-4 text-sm text-gray-600 dark:text-gray-400"
            {
                "You have worked on " (format_visits(earnings.visits)) " cars this month. "
                (link(endpoints::COMMISSIONS_VIEW, "See the breakdown"))
                "."
            }

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use time::OffsetDateTime;

    use crate::{
        app_state::DbTimezoneState,
        employee::Role,
        test_utils::{
            assert_valid_html, must_create_employee, must_create_service,
            must_create_transaction, open_test_db, parse_html_document, select_text,
        },
    };

    use super::get_dashboard_page;

    #[tokio::test]
    async fn shows_todays_sales_and_earnings() {
        let connection = open_test_db();
        let aroha = must_create_employee("Aroha", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let today = OffsetDateTime::now_utc().date();
        must_create_transaction(None, service.id, aroha.id, today, &connection);
        must_create_transaction(None, service.id, aroha.id, today, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(aroha.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "#today-visits"), vec!["2"]);
        assert_eq!(select_text(&html, "#today-revenue"), vec!["$50.00"]);
        assert_eq!(select_text(&html, "#today-tips"), vec!["$0.00"]);
        assert_eq!(select_text(&html, "#month-earnings"), vec!["$16.00"]);
        assert_eq!(select_text(&html, "#daily-revenue-chart").len(), 1);
    }

    #[tokio::test]
    async fn empty_database_shows_zeroes() {
        let connection = open_test_db();
        let aroha = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state), Extension(aroha.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(select_text(&html, "#today-visits"), vec!["0"]);
        assert_eq!(select_text(&html, "#month-earnings"), vec!["$0.00"]);
    }
}

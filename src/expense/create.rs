//! The page and endpoint for recording an expense.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::DbTimezoneState,
    employee::{Employee, EmployeeId, get_all_employees, get_employee},
    endpoints,
    expense::{ExpenseBuilder, create_expense},
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, dollar_input,
        dollar_input_styles, submit_button,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// Form data for recording an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    pub date: Date,
    pub amount: f64,
    pub description: String,
    /// Empty for a business expense.
    pub employee_id: Option<i64>,
}

/// Renders the form for recording an expense.
///
/// Washers may only record their own expenses, so the "Paid by" choice only
/// lists them.
pub async fn get_new_expense_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let current_employee = get_employee(employee_id, &connection)?;
    let (employees, allow_business) = if current_employee.role.can_void_records() {
        (get_all_employees(&connection)?, true)
    } else {
        (vec![current_employee.clone()], false)
    };

    Ok(new_expense_view(&employees, allow_business, current_employee.id, today).into_response())
}

fn new_expense_view(
    employees: &[Employee],
    allow_business: bool,
    current_employee: EmployeeId,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::POST_EXPENSE)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h1 class="text-xl font-bold" { "Record Expense" }

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
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="e.g. Chamois"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (dollar_input("amount", "Amount", None, true))

                div
                {
                    label for="employee_id" class=(FORM_LABEL_STYLE) { "Paid by" }

                    select id="employee_id" name="employee_id" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @if allow_business {
                            option value="" { "Business" }
                        }

                        @for employee in employees {
                            option value=(employee.id) selected[employee.id == current_employee]
                            {
                                (employee.name)
                            }
                        }
                    }
                }

                (submit_button("Record Expense"))
            }
        }
    };

    base("Record Expense", &[dollar_input_styles()], &content)
}

/// A route handler for recording an expense, redirects to the expenses view on success.
pub async fn create_expense_endpoint(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        tracing::error!("Tried to record an expense with the future date {}", form.date);
        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let payer = form.employee_id.map(EmployeeId::new);

    if payer != Some(employee_id) {
        let may_record_for_others = match get_employee(employee_id, &connection) {
            Ok(employee) => employee.role.can_void_records(),
            Err(error) => return error.into_alert_response(),
        };

        if !may_record_for_others {
            tracing::warn!("employee {employee_id} tried to record an expense for {payer:?}");
            return Error::Forbidden.into_alert_response();
        }
    }

    let builder = ExpenseBuilder {
        date: form.date,
        amount: form.amount,
        description: form.description,
        employee_id: payer,
    };

    match create_expense(builder, &connection) {
        Ok(expense) => {
            tracing::info!("recorded expense {} of {}", expense.id, expense.amount);

            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_alert_response()
        }
    }
}

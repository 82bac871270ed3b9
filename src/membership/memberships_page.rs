//! The page listing memberships, with the form for signing a customer up.

use std::collections::HashMap;

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
    employee::{EmployeeId, get_employee},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, dollar_input, dollar_input_styles, format_currency, link, submit_button,
    },
    membership::{Membership, get_all_memberships},
    navigation::NavBar,
    timezone::local_today,
};

/// Render every membership, newest first.
///
/// Admins and managers also get the sign-up form and cancel buttons.
pub async fn get_memberships_page(
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let can_manage = get_employee(employee_id, &connection)?
        .role
        .can_manage_catalog();

    let memberships = get_all_memberships(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve memberships: {error}"))?;
    let customers = get_all_customers(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve customers: {error}"))?;

    Ok(memberships_view(&memberships, &customers, today, can_manage).into_response())
}

fn new_membership_form(customers: &[Customer], today: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_MEMBERSHIP)
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4"
        {
            h2 class="text-lg font-semibold" { "New Membership" }

            div
            {
                label for="customer_id" class=(FORM_LABEL_STYLE) { "Customer" }

                select id="customer_id" name="customer_id" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for customer in customers {
                        option value=(customer.id) { (customer.name) }
                    }
                }
            }

            div
            {
                label for="plan" class=(FORM_LABEL_STYLE) { "Plan" }

                input
                    id="plan"
                    type="text"
                    name="plan"
                    placeholder="e.g. Unlimited Express"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (dollar_input("monthly_price", "Monthly Price", None, true))

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

                input
                    id="start_date"
                    type="date"
                    name="start_date"
                    value=(today)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Add Membership"))
        }
    }
}

fn memberships_view(
    memberships: &[Membership],
    customers: &[Customer],
    today: Date,
    can_manage: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::MEMBERSHIPS_VIEW).into_html();
    let customer_names: HashMap<_, _> = customers
        .iter()
        .map(|customer| (customer.id, customer.name.as_str()))
        .collect();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Memberships" }

                div class="overflow-x-auto"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Customer" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Plan" }
                                th scope="col" class="px-6 py-4 text-right" { "Monthly" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Started" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Ends" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }

                                @if can_manage {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                                }
                            }
                        }

                        tbody
                        {
                            @for membership in memberships {
                                @let customer_url = endpoints::format_endpoint(
                                    endpoints::CUSTOMER_VIEW,
                                    membership.customer_id,
                                );
                                @let customer_name = customer_names
                                    .get(&membership.customer_id)
                                    .copied()
                                    .unwrap_or_default();

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (link(&customer_url, customer_name)) }
                                    td class=(TABLE_CELL_STYLE) { (membership.plan) }
                                    td class="px-6 py-4 text-right" { (format_currency(membership.monthly_price)) }
                                    td class=(TABLE_CELL_STYLE) { (membership.start_date) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if let Some(end_date) = membership.end_date {
                                            (end_date)
                                        }
                                    }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if membership.is_active_on(today) {
                                            span class=(BADGE_STYLE) { "Active" }
                                        } @else if membership.start_date > today {
                                            "Upcoming"
                                        } @else {
                                            "Ended"
                                        }
                                    }

                                    @if can_manage {
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            @if membership.end_date.is_none() {
                                                button
                                                    type="button"
                                                    hx-post=(endpoints::format_endpoint(endpoints::CANCEL_MEMBERSHIP, membership.id))
                                                    hx-confirm="Are you sure you want to cancel this membership? It will end today."
                                                    hx-target-error="#alert-container"
                                                    class=(BUTTON_DELETE_STYLE)
                                                {
                                                    "Cancel"
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if memberships.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400" { "No memberships yet." }
                }

                @if can_manage {
                    @if customers.is_empty() {
                        p { "Add a customer before signing them up for a membership." }
                    } @else {
                        (new_membership_form(customers, today))
                    }
                }
            }
        }
    );

    base("Memberships", &[dollar_input_styles()], &content)
}

//! The public page where customers look up their loyalty progress by phone number.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::DbTimezoneState,
    customer::{Customer, get_customers_by_phone},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        centered_card,
    },
    loyalty::{Coupon, get_coupons_for_customer, visits_until_next_coupon},
    membership::{Membership, get_memberships_for_customer},
    timezone::local_today,
    transaction::count_customer_visits,
};

/// The phone number typed into the portal.
#[derive(Debug, Default, Deserialize)]
pub struct PortalQuery {
    pub phone: Option<String>,
}

/// What a customer can see about themselves.
struct CustomerStatus {
    customer: Customer,
    visits: i64,
    unredeemed_coupons: Vec<Coupon>,
    active_membership: Option<Membership>,
}

/// Render the phone lookup form and, if a phone number was given, the status
/// of every customer with that number.
pub async fn get_portal_page(
    State(state): State<DbTimezoneState>,
    Query(query): Query<PortalQuery>,
) -> Result<Response, Error> {
    let phone = query.phone.unwrap_or_default();

    if phone.trim().is_empty() {
        return Ok(portal_view("", None).into_response());
    }

    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let statuses = get_customers_by_phone(&phone, &connection)?
        .into_iter()
        .map(|customer| {
            let visits = count_customer_visits(customer.id, &connection)?;
            let unredeemed_coupons = get_coupons_for_customer(customer.id, &connection)?
                .into_iter()
                .filter(|coupon| !coupon.is_redeemed())
                .collect();
            let active_membership = get_memberships_for_customer(customer.id, &connection)?
                .into_iter()
                .find(|membership| membership.is_active_on(today));

            Ok(CustomerStatus {
                customer,
                visits,
                unredeemed_coupons,
                active_membership,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(portal_view(&phone, Some((&statuses, today))).into_response())
}

fn status_view(status: &CustomerStatus, today: Date) -> Markup {
    html!(
        section class="customer-status space-y-2 text-gray-900 dark:text-white"
        {
            h2 class="text-lg font-semibold" { (status.customer.name) }

            p { "Visits: " span class="visits" { (status.visits) } }
            p {
                span class="next-coupon" { (visits_until_next_coupon(status.visits)) }
                " more visits until your next free wash."
            }

            @if status.unredeemed_coupons.is_empty() {
                p class="coupons" { "No coupons to use." }
            } @else {
                ul class="coupons list-disc list-inside"
                {
                    @for coupon in &status.unredeemed_coupons {
                        li { (coupon.code) " issued " (coupon.issued_on) }
                    }
                }
            }

            @match &status.active_membership {
                Some(membership) => {
                    p class="membership"
                    {
                        span class=(BADGE_STYLE) { "Member" }
                        " " (membership.plan)
                        @if let Some(end_date) = membership.end_date {
                            " until " (end_date)
                        }
                    }
                }
                None => {
                    p class="membership" { "No active membership on " (today) "." }
                }
            }
        }
    )
}

fn portal_view(phone: &str, results: Option<(&[CustomerStatus], Date)>) -> Markup {
    let content = html!(
        form method="get" action=(endpoints::PORTAL_VIEW) class="space-y-4"
        {
            div
            {
                label for="phone" class=(FORM_LABEL_STYLE) { "Phone number" }
                input
                    type="tel"
                    name="phone"
                    id="phone"
                    value=(phone)
                    placeholder="021 555 0101"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Look up" }
        }

        @if let Some((statuses, today)) = results {
            @if statuses.is_empty() {
                p id="no-match" class="text-gray-900 dark:text-white"
                {
                    "We could not find a customer with that phone number."
                }
            } @else {
                @for status in statuses {
                    (status_view(status, today))
                }
            }
        }
    );

    base("My Visits", &[], &centered_card("Check your visits", &content))
}

//! The page showing everything known about one customer.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    app_state::DbTimezoneState,
    customer::{Customer, CustomerId, Vehicle, get_customer, get_vehicles_for_customer},
    employee::{EmployeeId, get_employee},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE,
        base, format_currency, submit_button,
    },
    loyalty::{Coupon, available_coupons, get_coupons_for_customer, visits_until_next_coupon},
    membership::{Membership, get_memberships_for_customer},
    navigation::NavBar,
    timezone::local_today,
    transaction::count_customer_visits,
};

struct CustomerDetails {
    customer: Customer,
    visits: i64,
    vehicles: Vec<Vehicle>,
    coupons: Vec<Coupon>,
    memberships: Vec<Membership>,
}

/// Render a customer's contact details, visit count, vehicles, coupons and
/// memberships.
pub async fn get_customer_page(
    Path(customer_id): Path<CustomerId>,
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

    let details = CustomerDetails {
        customer: get_customer(customer_id, &connection)?,
        visits: count_customer_visits(customer_id, &connection)?,
        vehicles: get_vehicles_for_customer(customer_id, &connection)?,
        coupons: get_coupons_for_customer(customer_id, &connection)?,
        memberships: get_memberships_for_customer(customer_id, &connection)?,
    };

    Ok(customer_view(&details, today, can_manage).into_response())
}

fn vehicle_form(customer_id: CustomerId) -> Markup {
    let text_input = |name: &str, label: &str, required: bool| {
        html! {
            div
            {
                label for=(name) class=(FORM_LABEL_STYLE) { (label) }

                input
                    id=(name)
                    type="text"
                    name=(name)
                    required[required]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    };

    html! {
        form
            hx-post=(endpoints::format_endpoint(endpoints::POST_VEHICLE, customer_id))
            hx-target-error="#alert-container"
            class="grid grid-cols-2 gap-4 max-w-xl"
        {
            (text_input("plate", "Plate", true))
            (text_input("make", "Make", false))
            (text_input("model", "Model", false))
            (text_input("colour", "Colour", false))

            div class="col-span-2" { (submit_button("Add Vehicle")) }
        }
    }
}

fn customer_view(details: &CustomerDetails, today: Date, can_manage: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::CUSTOMERS_VIEW).into_html();
    let customer = &details.customer;
    let issued = details.coupons.len() as i64;
    let coupons_due = available_coupons(details.visits, issued);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-4xl"
            {
                header
                {
                    h1 class="text-xl font-bold" { (customer.name) }

                    dl class="grid grid-cols-[max-content_1fr] gap-x-4 gap-y-1 mt-2"
                    {
                        dt class="font-semibold" { "Phone" }
                        dd id="phone" { (customer.phone) }
                        dt class="font-semibold" { "Email" }
                        dd id="email" { (customer.email) }
                        dt class="font-semibold" { "Visits" }
                        dd id="visits" { (details.visits) }
                        dt class="font-semibold" { "Next free wash in" }
                        dd id="next-coupon" { (visits_until_next_coupon(details.visits)) " visits" }
                    }

                    @if !customer.notes.is_empty() {
                        p class="mt-2 whitespace-pre-line" { (customer.notes) }
                    }
                }

                section class="space-y-2"
                {
                    h2 class="text-lg font-semibold" { "Vehicles" }

                    table id="vehicles" class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Plate" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Make" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Model" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Colour" }
                            }
                        }

                        tbody
                        {
                            @for vehicle in &details.vehicles {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (vehicle.plate) }
                                    td class=(TABLE_CELL_STYLE) { (vehicle.make) }
                                    td class=(TABLE_CELL_STYLE) { (vehicle.model) }
                                    td class=(TABLE_CELL_STYLE) { (vehicle.colour) }
                                }
                            }
                        }
                    }

                    (vehicle_form(customer.id))
                }

                section class="space-y-2"
                {
                    h2 class="text-lg font-semibold" { "Coupons" }

                    @if can_manage && coupons_due > 0 {
                        button
                            type="button"
                            hx-post=(endpoints::format_endpoint(endpoints::ISSUE_COUPON, customer.id))
                            hx-target-error="#alert-container"
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Issue Coupon (" (coupons_due) " earned)"
                        }
                    }

                    table id="coupons" class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Code" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Issued" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Redeemed" }
                            }
                        }

                        tbody
                        {
                            @for coupon in &details.coupons {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (coupon.code) }
                                    td class=(TABLE_CELL_STYLE) { (coupon.issued_on) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if let Some(redeemed_on) = coupon.redeemed_on {
                                            (redeemed_on)
                                        } @else if can_manage {
                                            button
                                                type="button"
                                                hx-post=(endpoints::format_endpoint(endpoints::REDEEM_COUPON, coupon.id))
                                                hx-confirm="Mark this coupon as used?"
                                                hx-target-error="#alert-container"
                                                class=(BUTTON_SECONDARY_STYLE)
                                            {
                                                "Redeem"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                section class="space-y-2"
                {
                    h2 class="text-lg font-semibold" { "Memberships" }

                    table id="memberships" class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Plan" }
                                th scope="col" class="px-6 py-4 text-right" { "Monthly" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Started" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                            }
                        }

                        tbody
                        {
                            @for membership in &details.memberships {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (membership.plan) }
                                    td class="px-6 py-4 text-right" { (format_currency(membership.monthly_price)) }
                                    td class=(TABLE_CELL_STYLE) { (membership.start_date) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if membership.is_active_on(today) {
                                            span class=(BADGE_STYLE) { "Active" }
                                        } @else if let Some(end_date) = membership.end_date {
                                            "Ended " (end_date)
                                        } @else {
                                            "Starts " (membership.start_date)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base(&customer.name, &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
    };
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        app_state::DbTimezoneState,
        customer::{CustomerBuilder, VehicleFormData, create_customer, create_vehicle, get_customer_page},
        employee::Role,
        endpoints,
        loyalty::issue_coupon,
        membership::{MembershipBuilder, create_membership},
        test_utils::{
            assert_hx_endpoint, assert_valid_html, must_create_employee, must_create_service,
            must_create_transaction, must_get_form, open_test_db, parse_html_document, select_text,
        },
    };

    #[tokio::test]
    async fn shows_visits_vehicles_coupons_and_memberships() {
        let connection = open_test_db();
        let manager = must_create_employee("Mere", Role::Manager, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let customer = create_customer(
            CustomerBuilder {
                name: "Jane Doe".to_owned(),
                phone: "021 555 0101".to_owned(),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        create_vehicle(
            customer.id,
            VehicleFormData {
                make: "Toyota".to_owned(),
                model: "Corolla".to_owned(),
                colour: "Silver".to_owned(),
                plate: "abc123".to_owned(),
            },
            &connection,
        )
        .unwrap();
        for _ in 0..23 {
            must_create_transaction(
                Some(customer.id),
                service.id,
                manager.id,
                date!(2025 - 01 - 05),
                &connection,
            );
        }
        issue_coupon(customer.id, date!(2025 - 01 - 05), &connection).unwrap();
        create_membership(
            MembershipBuilder {
                customer_id: customer.id,
                plan: "Unlimited".to_owned(),
                monthly_price: 49.0,
                start_date: OffsetDateTime::now_utc().date(),
            },
            &connection,
        )
        .unwrap();
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_customer_page(Path(customer.id), State(state), Extension(manager.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "h1"), vec!["Jane Doe"]);
        assert_eq!(select_text(&html, "#visits"), vec!["23"]);
        assert_eq!(select_text(&html, "#next-coupon"), vec!["7 visits"]);
        assert_eq!(select_text(&html, "#vehicles tbody td:first-child"), vec!["ABC123"]);
        assert_eq!(
            select_text(&html, "#coupons tbody td:first-child"),
            vec![format!("WB-{}-1", customer.id)]
        );
        assert_eq!(
            select_text(&html, "#coupons tbody button"),
            vec!["Redeem"]
        );
        assert_eq!(
            select_text(&html, "button[hx-post$=\"/coupons\"]"),
            vec!["Issue Coupon (1 earned)"]
        );
        assert_eq!(
            select_text(&html, "#memberships tbody td:last-child"),
            vec!["Active"]
        );
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::POST_VEHICLE, customer.id),
            "hx-post",
        );
    }

    #[tokio::test]
    async fn washer_cannot_issue_or_redeem() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let service = must_create_service("Express Wash", 25.0, 8.0, &connection);
        let customer = create_customer(
            CustomerBuilder {
                name: "Jane".to_owned(),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();
        for _ in 0..20 {
            must_create_transaction(
                Some(customer.id),
                service.id,
                washer.id,
                date!(2025 - 01 - 05),
                &connection,
            );
        }
        issue_coupon(customer.id, date!(2025 - 01 - 05), &connection).unwrap();
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_customer_page(Path(customer.id), State(state), Extension(washer.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(select_text(&html, "#coupons tbody tr").len(), 1);
        assert!(select_text(&html, "main button[type=button]").is_empty());
    }

    #[tokio::test]
    async fn missing_customer_is_not_found() {
        let connection = open_test_db();
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbTimezoneState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_customer_page(Path(7), State(state), Extension(washer.id)).await;

        assert!(matches!(result, Err(Error::NotFound)));
    }
}

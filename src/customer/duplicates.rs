//! Finding customer records that probably describe the same person, and the
//! page that lists them.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Serialize;

use crate::{
    Error,
    app_state::DbState,
    customer::{Customer, digits_only, get_all_customers},
    employee::{EmployeeId, Role, require_role},
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base, link,
    },
    navigation::NavBar,
};

/// Why the customers in a [DuplicateGroup] were grouped together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuplicateReason {
    /// Every match had the same name as the first customer.
    SameName,
    /// Every match had the same phone number as the first customer.
    SamePhone,
    /// Every match had both the same name and the same phone number.
    SameNameAndPhone,
    /// Some matched on name and others on phone number.
    SameNameOrPhone,
}

impl DuplicateReason {
    fn label(self) -> &'static str {
        match self {
            DuplicateReason::SameName => "Same name",
            DuplicateReason::SamePhone => "Same phone",
            DuplicateReason::SameNameAndPhone => "Same name and phone",
            DuplicateReason::SameNameOrPhone => "Same name or phone",
        }
    }
}

/// Customers that look like the same person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub reason: DuplicateReason,
    /// The first customer is the one the others matched against.
    pub customers: Vec<Customer>,
}

/// Group customers that share a name or a phone number.
///
/// Names match when equal after trimming, ignoring case. Phone numbers match
/// when their digits are equal. Empty names and phone numbers never match.
///
/// Customers are visited in input order. Each unvisited customer collects
/// every later unvisited customer that matches it, so a customer appears in
/// at most one group and the output only depends on the input order.
pub fn find_duplicate_groups(customers: &[Customer]) -> Vec<DuplicateGroup> {
    let keys: Vec<(String, String)> = customers
        .iter()
        .map(|customer| {
            (
                customer.name.trim().to_lowercase(),
                digits_only(&customer.phone),
            )
        })
        .collect();

    let mut visited = vec![false; customers.len()];
    let mut groups = Vec::new();

    for anchor in 0..customers.len() {
        if visited[anchor] {
            continue;
        }

        let (anchor_name, anchor_phone) = &keys[anchor];
        let mut members = Vec::new();
        let mut any_name_only = false;
        let mut any_phone_only = false;
        let mut all_both = true;

        for other in (anchor + 1)..customers.len() {
            if visited[other] {
                continue;
            }

            let (name, phone) = &keys[other];
            let same_name = !anchor_name.is_empty() && anchor_name == name;
            let same_phone = !anchor_phone.is_empty() && anchor_phone == phone;

            if !same_name && !same_phone {
                continue;
            }

            any_name_only |= same_name && !same_phone;
            any_phone_only |= same_phone && !same_name;
            all_both &= same_name && same_phone;
            members.push(other);
        }

        if members.is_empty() {
            continue;
        }

        let reason = match (all_both, any_name_only, any_phone_only) {
            (true, _, _) => DuplicateReason::SameNameAndPhone,
            (false, true, false) => DuplicateReason::SameName,
            (false, false, true) => DuplicateReason::SamePhone,
            _ => DuplicateReason::SameNameOrPhone,
        };

        visited[anchor] = true;
        let mut group = vec![customers[anchor].clone()];

        for member in members {
            visited[member] = true;
            group.push(customers[member].clone());
        }

        groups.push(DuplicateGroup {
            reason,
            customers: group,
        });
    }

    groups
}

/// Render the groups of customers that look like duplicates, with buttons to
/// merge each duplicate into the first customer of its group.
pub async fn get_duplicate_customers_page(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_role(employee_id, Role::can_manage_customers, &connection)?;

    let customers = get_all_customers(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve customers: {error}"))?;
    let groups = find_duplicate_groups(&customers);

    Ok(duplicates_view(&groups).into_response())
}

fn duplicates_view(groups: &[DuplicateGroup]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DUPLICATE_CUSTOMERS_VIEW).into_html();

    let group_table = |group: &DuplicateGroup| {
        let keep = &group.customers[0];

        html! {
            div class="space-y-2"
            {
                span class=(BADGE_STYLE) { (group.reason.label()) }

                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Phone" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Email" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Action" }
                        }
                    }

                    tbody
                    {
                        @for (index, customer) in group.customers.iter().enumerate() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (link(
                                        &endpoints::format_endpoint(endpoints::CUSTOMER_VIEW, customer.id),
                                        &customer.name,
                                    ))
                                }
                                td class=(TABLE_CELL_STYLE) { (customer.phone) }
                                td class=(TABLE_CELL_STYLE) { (customer.email) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if index == 0 {
                                        "Keep"
                                    } @else {
                                        button
                                            type="button"
                                            hx-post=(endpoints::MERGE_CUSTOMERS)
                                            hx-vals=(format!(r#"{{"keep_id": {}, "duplicate_id": {}}}"#, keep.id, customer.id))
                                            hx-confirm=(format!("Merge this record into {}? This cannot be undone.", keep.name))
                                            hx-target-error="#alert-container"
                                            class=(BUTTON_DELETE_STYLE)
                                        {
                                            "Merge"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Possible Duplicate Customers" }

                @if groups.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "No duplicates found." }
                }

                @for group in groups {
                    (group_table(group))
                }
            }
        }
    };

    base("Duplicate Customers", &[], &content)
}

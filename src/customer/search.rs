//! Fuzzy customer search.

use crate::customer::{Customer, Vehicle, digits_only};

/// Keep the customers matching `query`, in their original order.
///
/// A customer matches when their name contains the query ignoring case, when
/// the digits of their phone number contain the digits of the query, or when
/// one of their vehicles' plates contains the query ignoring case and spaces.
/// A blank query matches everyone.
pub fn search_customers(customers: Vec<Customer>, vehicles: &[Vehicle], query: &str) -> Vec<Customer> {
    let query = query.trim();

    if query.is_empty() {
        return customers;
    }

    let name_query = query.to_lowercase();
    let phone_query = digits_only(query);
    let plate_query = normalize_plate(query);

    customers
        .into_iter()
        .filter(|customer| {
            if customer.name.to_lowercase().contains(&name_query) {
                return true;
            }

            if !phone_query.is_empty() && digits_only(&customer.phone).contains(&phone_query) {
                return true;
            }

            !plate_query.is_empty()
                && vehicles.iter().any(|vehicle| {
                    vehicle.customer_id == customer.id
                        && normalize_plate(&vehicle.plate).contains(&plate_query)
                })
        })
        .collect()
}

fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

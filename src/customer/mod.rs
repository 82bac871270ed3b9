//! Customers, their vehicles, and tools for finding and merging duplicate
//! customer records.

mod create;
mod db;
mod delete;
mod detail;
mod domain;
mod duplicates;
mod list;
mod merge;
mod search;
mod vehicle;

pub use create::{create_customer_endpoint, get_new_customer_page};
pub use db::{
    create_customer, create_customer_table, create_vehicle, create_vehicle_table,
    get_all_customers, get_customer, get_customers_by_phone, get_vehicles_for_customer,
};
pub use delete::delete_customer_endpoint;
pub use detail::get_customer_page;
pub use domain::{
    Customer, CustomerBuilder, CustomerId, Vehicle, VehicleFormData, VehicleId, digits_only,
};
pub use duplicates::{
    DuplicateGroup, DuplicateReason, find_duplicate_groups, get_duplicate_customers_page,
};
pub use list::get_customers_page;
pub use merge::{merge_customers, merge_customers_endpoint};
pub use search::search_customers;
pub use vehicle::create_vehicle_endpoint;

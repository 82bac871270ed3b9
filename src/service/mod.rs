//! The service catalog: the washes and details on offer, their prices and
//! the commission paid to whoever does the work.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_service_endpoint, get_new_service_page};
pub use db::{
    create_service, create_service_table, get_active_services, get_all_services, get_service,
};
pub use delete::delete_service_endpoint;
pub use domain::{Service, ServiceBuilder, ServiceId};
pub use edit::{get_edit_service_page, update_service_endpoint};
pub use list::get_services_page;

//! Employee accounts, their roles and the pages for managing them.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_employee_endpoint, get_new_employee_page};
pub use db::{
    create_employee, create_employee_table, get_all_employees, get_employee,
    get_employee_by_name, require_role, update_employee_password,
};
pub use delete::delete_employee_endpoint;
pub use domain::{Employee, EmployeeId, EmployeeName, Role};
pub use edit::{get_edit_employee_page, update_employee_endpoint};
pub use list::get_employees_page;

//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/customers/{customer_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in employees.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
/// The customer self-service page.
pub const PORTAL_VIEW: &str = "/portal";

/// The page for listing employees.
pub const EMPLOYEES_VIEW: &str = "/employees";
/// The page for adding an employee.
pub const NEW_EMPLOYEE_VIEW: &str = "/employees/new";
/// The page for editing an employee.
pub const EDIT_EMPLOYEE_VIEW: &str = "/employees/{employee_id}/edit";

/// The page for listing the service catalog.
pub const SERVICES_VIEW: &str = "/services";
/// The page for adding a service to the catalog.
pub const NEW_SERVICE_VIEW: &str = "/services/new";
/// The page for editing a service.
pub const EDIT_SERVICE_VIEW: &str = "/services/{service_id}/edit";

/// The page for listing and searching customers.
pub const CUSTOMERS_VIEW: &str = "/customers";
/// The page for adding a customer.
pub const NEW_CUSTOMER_VIEW: &str = "/customers/new";
/// The page showing a single customer with their vehicles, coupons and membership.
pub const CUSTOMER_VIEW: &str = "/customers/{customer_id}";
/// The page listing groups of customers that look like duplicates.
pub const DUPLICATE_CUSTOMERS_VIEW: &str = "/customers/duplicates";

/// The page for listing sales.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The point-of-sale page for recording a sale.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";

/// The commission report page.
pub const COMMISSIONS_VIEW: &str = "/commissions";

/// The page for listing expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording an expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";

/// The page for listing memberships.
pub const MEMBERSHIPS_VIEW: &str = "/memberships";

/// The route for logging in an employee.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current employee.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create an employee.
pub const POST_EMPLOYEE: &str = "/api/employees";
/// The route to update an employee.
pub const PUT_EMPLOYEE: &str = "/api/employees/{employee_id}";
/// The route to delete an employee.
pub const DELETE_EMPLOYEE: &str = "/api/employees/{employee_id}";
/// The route to create a service.
pub const POST_SERVICE: &str = "/api/services";
/// The route to update a service.
pub const PUT_SERVICE: &str = "/api/services/{service_id}";
/// The route to delete a service.
pub const DELETE_SERVICE: &str = "/api/services/{service_id}";
/// The route to create a customer.
pub const POST_CUSTOMER: &str = "/api/customers";
/// The route to delete a customer.
pub const DELETE_CUSTOMER: &str = "/api/customers/{customer_id}";
/// The route to add a vehicle to a customer.
pub const POST_VEHICLE: &str = "/api/customers/{customer_id}/vehicles";
/// The route to merge a duplicate customer into another.
pub const MERGE_CUSTOMERS: &str = "/api/customers/merge";
/// The route to issue a loyalty coupon to a customer.
pub const ISSUE_COUPON: &str = "/api/customers/{customer_id}/coupons";
/// The route to redeem a loyalty coupon.
pub const REDEEM_COUPON: &str = "/api/coupons/{coupon_id}/redeem";
/// The route to record a sale.
pub const POST_TRANSACTION: &str = "/api/transactions";
/// The route to delete a sale.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to download the commission report as CSV.
pub const COMMISSIONS_CSV: &str = "/api/commissions.csv";
/// The route to record an expense.
pub const POST_EXPENSE: &str = "/api/expenses";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to start a membership.
pub const POST_MEMBERSHIP: &str = "/api/memberships";
/// The route to cancel a membership.
pub const CANCEL_MEMBERSHIP: &str = "/api/memberships/{membership_id}/cancel";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/customers/{customer_id}', '{customer_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

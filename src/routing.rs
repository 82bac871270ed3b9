//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    commission::{get_commissions_csv, get_commissions_page},
    customer::{
        create_customer_endpoint, create_vehicle_endpoint, delete_customer_endpoint,
        get_customer_page, get_customers_page, get_duplicate_customers_page,
        get_new_customer_page, merge_customers_endpoint,
    },
    dashboard::get_dashboard_page,
    employee::{
        create_employee_endpoint, delete_employee_endpoint, get_edit_employee_page,
        get_employees_page, get_new_employee_page, update_employee_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_page, get_new_expense_page,
    },
    internal_server_error::get_internal_server_error_page,
    loyalty::{issue_coupon_endpoint, redeem_coupon_endpoint},
    membership::{cancel_membership_endpoint, create_membership_endpoint, get_memberships_page},
    not_found::get_404_not_found,
    portal::get_portal_page,
    service::{
        create_service_endpoint, delete_service_endpoint, get_edit_service_page,
        get_new_service_page, get_services_page, update_service_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::PORTAL_VIEW, get(get_portal_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EMPLOYEES_VIEW, get(get_employees_page))
        .route(endpoints::NEW_EMPLOYEE_VIEW, get(get_new_employee_page))
        .route(endpoints::EDIT_EMPLOYEE_VIEW, get(get_edit_employee_page))
        .route(endpoints::SERVICES_VIEW, get(get_services_page))
        .route(endpoints::NEW_SERVICE_VIEW, get(get_new_service_page))
        .route(endpoints::EDIT_SERVICE_VIEW, get(get_edit_service_page))
        .route(endpoints::CUSTOMERS_VIEW, get(get_customers_page))
        .route(endpoints::NEW_CUSTOMER_VIEW, get(get_new_customer_page))
        .route(
            endpoints::DUPLICATE_CUSTOMERS_VIEW,
            get(get_duplicate_customers_page),
        )
        .route(endpoints::CUSTOMER_VIEW, get(get_customer_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::COMMISSIONS_VIEW, get(get_commissions_page))
        .route(endpoints::COMMISSIONS_CSV, get(get_commissions_csv))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::MEMBERSHIPS_VIEW, get(get_memberships_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::POST_EMPLOYEE, post(create_employee_endpoint))
            .route(endpoints::PUT_EMPLOYEE, put(update_employee_endpoint))
            .route(endpoints::DELETE_EMPLOYEE, delete(delete_employee_endpoint))
            .route(endpoints::POST_SERVICE, post(create_service_endpoint))
            .route(endpoints::PUT_SERVICE, put(update_service_endpoint))
            .route(endpoints::DELETE_SERVICE, delete(delete_service_endpoint))
            .route(endpoints::POST_CUSTOMER, post(create_customer_endpoint))
            .route(endpoints::DELETE_CUSTOMER, delete(delete_customer_endpoint))
            .route(endpoints::POST_VEHICLE, post(create_vehicle_endpoint))
            .route(endpoints::MERGE_CUSTOMERS, post(merge_customers_endpoint))
            .route(endpoints::ISSUE_COUPON, post(issue_coupon_endpoint))
            .route(endpoints::REDEEM_COUPON, post(redeem_coupon_endpoint))
            .route(
                endpoints::POST_TRANSACTION,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
            .route(endpoints::DELETE_EXPENSE, delete(delete_expense_endpoint))
            .route(endpoints::POST_MEMBERSHIP, post(create_membership_endpoint))
            .route(
                endpoints::CANCEL_MEMBERSHIP,
                post(cancel_membership_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

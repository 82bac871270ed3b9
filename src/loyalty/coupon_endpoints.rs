//! Endpoints for issuing and redeeming coupons.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error,
    app_state::DbTimezoneState,
    customer::CustomerId,
    employee::{EmployeeId, Role, require_role},
    endpoints,
    loyalty::{CouponId, issue_coupon, redeem_coupon},
    timezone::local_today,
};

fn redirect_to_customer(customer_id: CustomerId) -> Response {
    (
        HxRedirect(endpoints::format_endpoint(
            endpoints::CUSTOMER_VIEW,
            customer_id,
        )),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Issue the customer a coupon they have earned and reload their page.
pub async fn issue_coupon_endpoint(
    Path(customer_id): Path<CustomerId>,
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = require_role(employee_id, Role::can_manage_catalog, &connection) {
        return error.into_alert_response();
    }

    match issue_coupon(customer_id, today, &connection) {
        Ok(coupon) => {
            tracing::info!("issued coupon {} to customer {customer_id}", coupon.code);
            redirect_to_customer(customer_id)
        }
        Err(error) => {
            tracing::error!("could not issue coupon to customer {customer_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Mark a coupon as used and reload its customer's page.
pub async fn redeem_coupon_endpoint(
    Path(coupon_id): Path<CouponId>,
    State(state): State<DbTimezoneState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = require_role(employee_id, Role::can_manage_catalog, &connection) {
        return error.into_alert_response();
    }

    match redeem_coupon(coupon_id, today, &connection) {
        Ok(coupon) => {
            tracing::info!("redeemed coupon {}", coupon.code);
            redirect_to_customer(coupon.customer_id)
        }
        Err(error) => {
            tracing::error!("could not redeem coupon {coupon_id}: {error}");
            error.into_alert_response()
        }
    }
}

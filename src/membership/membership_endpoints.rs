//! Endpoints for signing customers up for memberships and cancelling them.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::{DbState, DbTimezoneState},
    customer::CustomerId,
    employee::{EmployeeId, Role, require_role},
    endpoints,
    membership::{MembershipBuilder, MembershipId, cancel_membership, create_membership},
    timezone::local_today,
};

/// Form data for a new membership.
#[derive(Debug, Deserialize)]
pub struct MembershipForm {
    pub customer_id: CustomerId,
    pub plan: String,
    pub monthly_price: f64,
    pub start_date: Date,
}

fn redirect_to_memberships() -> Response {
    (
        HxRedirect(endpoints::MEMBERSHIPS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// A route handler for signing a customer up, redirects to the memberships view on success.
pub async fn create_membership_endpoint(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
    Form(form): Form<MembershipForm>,
) -> Response {
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

    let builder = MembershipBuilder {
        customer_id: form.customer_id,
        plan: form.plan,
        monthly_price: form.monthly_price,
        start_date: form.start_date,
    };

    match create_membership(builder, &connection) {
        Ok(membership) => {
            tracing::info!(
                "customer {} joined the {} plan",
                membership.customer_id,
                membership.plan
            );
            redirect_to_memberships()
        }
        Err(error) => {
            tracing::error!("could not create membership: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler that ends a membership today.
pub async fn cancel_membership_endpoint(
    Path(membership_id): Path<MembershipId>,
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

    match cancel_membership(membership_id, today, &connection) {
        Ok(_) => redirect_to_memberships(),
        Err(error) => {
            tracing::error!("could not cancel membership {membership_id}: {error}");
            error.into_alert_response()
        }
    }
}

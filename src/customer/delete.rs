//! Customer deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    alert::Alert,
    app_state::DbState,
    customer::{CustomerId, db::delete_customer},
    employee::{EmployeeId, Role, require_role},
};

/// Handle customer deletion. Returns a success alert or an error alert.
pub async fn delete_customer_endpoint(
    Path(customer_id): Path<CustomerId>,
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = require_role(employee_id, Role::can_manage_customers, &connection) {
        return error.into_alert_response();
    }

    match delete_customer(customer_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Customer deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete customer {customer_id}: {error}");
            error.into_alert_response()
        }
    }
}

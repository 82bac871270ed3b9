//! Defines the endpoint for deleting a sale.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    alert::Alert,
    app_state::DbState,
    employee::{EmployeeId, Role, require_role},
    transaction::{TransactionId, delete_transaction},
};

/// A route handler for deleting a sale. Returns a success alert or an error alert.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
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

    if let Err(error) = require_role(employee_id, Role::can_void_records, &connection) {
        return error.into_alert_response();
    }

    match delete_transaction(transaction_id, &connection) {
        Ok(_) => {
            tracing::info!("employee {employee_id} deleted transaction {transaction_id}");

            Alert::SuccessSimple {
                message: "Sale deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

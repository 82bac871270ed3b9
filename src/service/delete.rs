//! Service deletion endpoint.

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
    service::{ServiceId, db::delete_service},
};

/// Handle service deletion. Returns a success alert or an error alert.
///
/// Services that have been sold stay in the catalog so the sales history
/// keeps its names; deactivate them instead.
pub async fn delete_service_endpoint(
    Path(service_id): Path<ServiceId>,
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

    if let Err(error) = require_role(employee_id, Role::can_manage_catalog, &connection) {
        return error.into_alert_response();
    }

    match delete_service(service_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Service deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete service {service_id}: {error}");
            error.into_alert_response()
        }
    }
}

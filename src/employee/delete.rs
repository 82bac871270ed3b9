//! Employee deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    alert::Alert,
    app_state::DbState,
    employee::{EmployeeId, Role, db::delete_employee, require_role},
};

/// Handle employee deletion. Returns a success alert or an error alert.
///
/// Admins cannot delete their own account, and employees who appear in the
/// sales history cannot be deleted at all.
pub async fn delete_employee_endpoint(
    Path(target_id): Path<i64>,
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

    if let Err(error) = require_role(employee_id, Role::can_manage_employees, &connection) {
        return error.into_alert_response();
    }

    let target_id = EmployeeId::new(target_id);

    if target_id == employee_id {
        return Error::CannotDeleteSelf.into_alert_response();
    }

    match delete_employee(target_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Employee deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete employee {target_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        app_state::DbState,
        employee::{Role, delete_employee_endpoint, get_employee},
        test_utils::{must_create_employee, open_test_db},
    };

    #[tokio::test]
    async fn admin_can_delete_employee() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_employee_endpoint(
            Path(washer.id.as_i64()),
            State(state.clone()),
            Extension(admin.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_employee(washer.id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_employee_endpoint(
            Path(admin.id.as_i64()),
            State(state.clone()),
            Extension(admin.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_employee(admin.id, &connection).is_ok());
    }

    #[tokio::test]
    async fn deleting_missing_employee_is_not_found() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_employee_endpoint(Path(42), State(state), Extension(admin.id)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn washer_cannot_delete() {
        let connection = open_test_db();
        let admin = must_create_employee("Boss", Role::Admin, &connection);
        let washer = must_create_employee("Aroha", Role::Washer, &connection);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_employee_endpoint(
            Path(admin.id.as_i64()),
            State(state),
            Extension(washer.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

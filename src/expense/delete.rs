//! Expense deletion endpoint.

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
    expense::{ExpenseId, delete_expense},
};

/// Handle expense deletion. Only admins and managers may delete expenses.
pub async fn delete_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
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

    match delete_expense(expense_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Expense deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete expense {expense_id}: {error}");
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
    use time::macros::date;

    use crate::{
        Error,
        app_state::DbState,
        employee::Role,
        expense::{ExpenseBuilder, create_expense, delete_expense_endpoint, get_expense},
        test_utils::{must_create_employee, open_test_db},
    };

    fn setup(role: Role) -> (DbState, crate::employee::EmployeeId, i64) {
        let connection = open_test_db();
        let employee = must_create_employee("Mere", role, &connection);
        let expense = create_expense(
            ExpenseBuilder {
                date: date!(2025 - 01 - 15),
                amount: 9.0,
                description: "Soap".to_owned(),
                employee_id: None,
            },
            &connection,
        )
        .unwrap();
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, employee.id, expense.id)
    }

    #[tokio::test]
    async fn manager_can_delete_expense() {
        let (state, manager, expense_id) = setup(Role::Manager);

        let response =
            delete_expense_endpoint(Path(expense_id), State(state.clone()), Extension(manager))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense_id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn washer_cannot_delete_expense() {
        let (state, washer, expense_id) = setup(Role::Washer);

        let response =
            delete_expense_endpoint(Path(expense_id), State(state), Extension(washer)).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deleting_missing_expense_is_not_found() {
        let (state, manager, _) = setup(Role::Admin);

        let response = delete_expense_endpoint(Path(404), State(state), Extension(manager)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Merging duplicate customer records.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    app_state::DbState,
    customer::{CustomerId, get_customer},
    employee::{EmployeeId, Role, require_role},
    endpoints,
};

/// Move everything that belongs to `duplicate_id` onto `keep_id`, then delete
/// the duplicate.
///
/// Vehicles, transactions, coupons and memberships are moved. The kept
/// customer takes the duplicate's phone number and email if they have none.
///
/// # Errors
///
/// Returns [Error::MergeSameCustomer] if both IDs are the same, or
/// [Error::InvalidReference] if either customer does not exist.
pub fn merge_customers(
    keep_id: CustomerId,
    duplicate_id: CustomerId,
    connection: &Connection,
) -> Result<(), Error> {
    if keep_id == duplicate_id {
        return Err(Error::MergeSameCustomer);
    }

    for id in [keep_id, duplicate_id] {
        get_customer(id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidReference("customer"),
            error => error,
        })?;
    }

    let transaction = connection.unchecked_transaction()?;

    for table in ["vehicle", "\"transaction\"", "coupon", "membership"] {
        transaction.execute(
            &format!("UPDATE {table} SET customer_id = ?1 WHERE customer_id = ?2"),
            [keep_id, duplicate_id],
        )?;
    }

    transaction.execute(
        "UPDATE customer SET
            phone = CASE WHEN phone = '' THEN (SELECT phone FROM customer WHERE id = ?2) ELSE phone END,
            email = CASE WHEN email = '' THEN (SELECT email FROM customer WHERE id = ?2) ELSE email END
        WHERE id = ?1",
        [keep_id, duplicate_id],
    )?;

    transaction.execute("DELETE FROM customer WHERE id = ?1", [duplicate_id])?;

    transaction.commit()?;

    Ok(())
}

/// The two customers to merge.
#[derive(Debug, Deserialize)]
pub struct MergeForm {
    /// The customer that remains.
    pub keep_id: CustomerId,
    /// The customer that is folded into `keep_id` and deleted.
    pub duplicate_id: CustomerId,
}

/// Handle a request to merge one customer into another and reload the
/// duplicates page.
pub async fn merge_customers_endpoint(
    State(state): State<DbState>,
    Extension(employee_id): Extension<EmployeeId>,
    Form(form): Form<MergeForm>,
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

    match merge_customers(form.keep_id, form.duplicate_id, &connection) {
        Ok(_) => {
            tracing::info!(
                "merged customer {} into customer {}",
                form.duplicate_id,
                form.keep_id
            );

            (
                HxRedirect(endpoints::DUPLICATE_CUSTOMERS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!(
                "could not merge customer {} into {}: {error}",
                form.duplicate_id,
                form.keep_id
            );
            error.into_alert_response()
        }
    }
}

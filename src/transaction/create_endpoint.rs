//! Defines the endpoint for recording a sale.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None and
// supports repeated fields, unlike axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    app_state::DbTimezoneState,
    endpoints,
    timezone::local_today,
    transaction::{create_transaction, form::TransactionForm},
};

/// A route handler for recording a sale, redirects to the transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<DbTimezoneState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        tracing::error!("Tried to record a sale with the future date {}", form.date);

        return Error::FutureDate(form.date).into_alert_response();
    }

    let builder = match form.into_builder() {
        Ok(builder) => builder,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(builder, &connection) {
        Ok(transaction) => {
            tracing::info!(
                "recorded transaction {} for {} employee(s)",
                transaction.id,
                transaction.assignments.len()
            );

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

//! Adding vehicles to a customer.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error,
    app_state::DbState,
    customer::{CustomerId, VehicleFormData, create_vehicle},
    endpoints,
};

/// Handle the form for adding a vehicle and reload the customer's page.
pub async fn create_vehicle_endpoint(
    Path(customer_id): Path<CustomerId>,
    State(state): State<DbState>,
    Form(form): Form<VehicleFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_vehicle(customer_id, form, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::format_endpoint(
                endpoints::CUSTOMER_VIEW,
                customer_id,
            )),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not add vehicle to customer {customer_id}: {error}");
            error.into_alert_response()
        }
    }
}

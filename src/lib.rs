//! WashBay is a web app for running a car wash.
//!
//! It keeps customer and vehicle records, the service catalog, point-of-sale
//! transactions, expenses, loyalty coupons and memberships, and works out how
//! much commission and tips each employee has earned.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod commission;
mod customer;
mod dashboard;
mod date_range;
mod db;
mod employee;
mod endpoints;
mod expense;
mod html;
mod internal_server_error;
mod logging;
mod loyalty;
mod membership;
mod navigation;
mod not_found;
mod portal;
mod routing;
mod service;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use commission::{Attribution, EmployeeSummary, aggregate, attribute};
pub use customer::{
    Customer, CustomerBuilder, CustomerId, DuplicateGroup, DuplicateReason, create_customer,
    find_duplicate_groups,
};
pub use date_range::DateRange;
pub use db::initialize as initialize_db;
pub use employee::{
    Employee, EmployeeId, EmployeeName, Role, create_employee, get_employee_by_name,
    update_employee_password,
};
pub use expense::{Expense, ExpenseBuilder, create_expense};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use service::{ServiceBuilder, create_service};
pub use timezone::get_local_offset;
pub use transaction::{Extra, Transaction, TransactionBuilder, create_transaction};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The employee name and password did not match a registered employee.
    #[error("invalid name or password")]
    InvalidCredentials,

    /// The auth token is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token in the cookie jar could not be parsed, or its expiry
    /// could not be updated.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The employee provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used for a name, e.g. of an employee or a service.
    ///
    /// The string is the kind of record, e.g. "Employee".
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),

    /// A string could not be parsed as an employee role.
    #[error("\"{0}\" is not a valid role")]
    InvalidRole(String),

    /// A money amount that must not be negative was negative (or not a number).
    #[error("{0} must be a non-negative amount")]
    InvalidAmount(&'static str),

    /// A date in the future was used to create a transaction or expense.
    ///
    /// Sales and expenses record events that have already happened, therefore
    /// future dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The end of a date range came before its start.
    #[error("the date range {0} to {1} ends before it starts")]
    InvalidDateRange(Date, Date),

    /// A transaction was submitted without anyone assigned to do the work.
    #[error("at least one employee must be assigned to a transaction")]
    NoEmployeesAssigned,

    /// An extra was assigned to an employee who is not working on the transaction.
    #[error("extras can only be assigned to employees working on the transaction")]
    ExtraAssigneeNotWorking,

    /// Tried to sell a service that has been taken off the catalog.
    #[error("\"{0}\" is no longer offered")]
    ServiceInactive(String),

    /// An ID in a form referred to a record that does not exist.
    ///
    /// The string names the kind of record, e.g. "customer".
    #[error("the {0} could not be found")]
    InvalidReference(&'static str),

    /// The specified employee name already exists in the database.
    #[error("an employee named \"{0}\" already exists")]
    DuplicateEmployeeName(String),

    /// The employee's role does not permit the requested action.
    #[error("you do not have permission to do that")]
    Forbidden,

    /// An employee tried to delete their own account.
    #[error("you cannot delete your own account")]
    CannotDeleteSelf,

    /// Tried to delete a record that sales history still refers to.
    ///
    /// The string names the kind of record, e.g. "service".
    #[error("the {0} is used by existing transactions")]
    InUse(&'static str),

    /// Tried to merge a customer into themself.
    #[error("cannot merge a customer into themself")]
    MergeSameCustomer,

    /// The customer has not made enough visits for another coupon.
    #[error("the customer is not eligible for a coupon")]
    NotEligibleForCoupon,

    /// The coupon has already been redeemed.
    #[error("the coupon {0} has already been redeemed")]
    CouponAlreadyRedeemed(String),

    /// The membership has already been cancelled.
    #[error("the membership has already ended")]
    MembershipAlreadyEnded,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The commission report could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a record that does not exist.
    ///
    /// The string names the kind of record, e.g. "employee".
    #[error("tried to update a {0} that is not in the database")]
    UpdateMissing(&'static str),

    /// Tried to delete a record that does not exist.
    ///
    /// The string names the kind of record, e.g. "employee".
    #[error("tried to delete a {0} that is not in the database")]
    DeleteMissing(&'static str),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                html::error_view(
                    "Forbidden",
                    "403",
                    "You do not have access to this page.",
                    "Ask an administrator if you think you should.",
                ),
            )
                .into_response(),
            Error::InvalidDateRange(start, end) => (
                StatusCode::BAD_REQUEST,
                html::error_view(
                    "Invalid Date Range",
                    "400",
                    &format!("The range {start} to {end} ends before it starts."),
                    "Choose an end date on or after the start date.",
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Permission denied".to_owned(),
                    details: "Your role does not allow this action.".to_owned(),
                },
            ),
            Error::UpdateMissing(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not update {kind}"),
                    details: format!("The {kind} could not be found."),
                },
            ),
            Error::DeleteMissing(kind) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: format!("Could not delete {kind}"),
                    details: format!(
                        "The {kind} could not be found. \
                        Try refreshing the page to see if the {kind} has already been deleted."
                    ),
                },
            ),
            Error::InUse(kind) => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: format!("Could not delete {kind}"),
                    details: format!(
                        "The {kind} is part of the sales history and cannot be deleted."
                    ),
                },
            ),
            error @ (Error::FutureDate(_)
            | Error::InvalidDateRange(..)
            | Error::NoEmployeesAssigned
            | Error::ExtraAssigneeNotWorking
            | Error::ServiceInactive(_)
            | Error::InvalidReference(_)
            | Error::InvalidAmount(_)
            | Error::EmptyName(_)
            | Error::InvalidRole(_)
            | Error::TooWeak(_)
            | Error::DuplicateEmployeeName(_)
            | Error::CannotDeleteSelf
            | Error::MergeSameCustomer
            | Error::NotEligibleForCoupon
            | Error::CouponAlreadyRedeemed(_)
            | Error::MembershipAlreadyEnded) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: capitalise_first(&error.to_string()),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "The requested resource could not be found".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

fn capitalise_first(text: &str) -> String {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

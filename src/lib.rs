//! Pocket Ledger is a personal-finance tool for recording income and expenses.
//!
//! Transactions live in a local SQLite database and user settings (monthly
//! salary, expense categories) in a small JSON file. The library provides the
//! storage and aggregation functions used by the `ledger` command line tool,
//! plus a REST API that directly serves the HTML pages of the local web UI.

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
pub mod config;
mod database_id;
mod db;
mod endpoints;
pub mod export;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod settings;
pub mod summary;
mod timezone;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::{get_local_offset, local_now};

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
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the in-memory settings.
    #[error("could not acquire the config lock")]
    ConfigLockError,

    /// The config file exists but does not contain a valid config.
    #[error("the config file \"{path}\" is invalid: {reason}")]
    InvalidConfig {
        /// Where the config file lives.
        path: String,
        /// Why the file could not be parsed.
        reason: String,
    },

    /// The config file could not be read or written.
    #[error("could not access the config file \"{path}\": {reason}")]
    ConfigIo {
        /// Where the config file lives.
        path: String,
        /// The underlying I/O error message.
        reason: String,
    },

    /// The text entered for an amount is not a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// Amounts are recorded as positive values, the kind says which way the money went.
    #[error("amounts cannot be negative, got {0}")]
    NegativeAmount(f64),

    /// The text entered for the monthly salary is not a non-negative number.
    #[error("\"{0}\" is not a valid salary")]
    InvalidSalary(String),

    /// The category used to create a transaction is not one of the configured categories.
    #[error("\"{0}\" is not one of the configured categories")]
    UnknownCategory(String),

    /// A category list must contain at least one non-empty name.
    #[error("the category list cannot be empty")]
    EmptyCategoryList,

    /// The text could not be parsed as a transaction timestamp.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    /// The start of a date range came after its end.
    #[error("the start date {start} is after the end date {end}")]
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Writing an export file failed.
    #[error("could not export transactions: {0}")]
    ExportError(String),
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
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::InvalidConfig { path, .. } => InternalServerError {
                description: "Invalid Settings File",
                fix: &format!(
                    "The settings file \"{path}\" could not be read. Fix or delete the file and \
                    restart the server."
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Whether the error was caused by bad user input rather than a fault in the application.
    fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount(_)
                | Error::NegativeAmount(_)
                | Error::InvalidSalary(_)
                | Error::UnknownCategory(_)
                | Error::EmptyCategoryList
                | Error::InvalidTimestamp(_)
                | Error::InvalidDateRange { .. }
        )
    }

    /// Render the error as an alert fragment for htmx requests.
    fn into_alert_response(self) -> Response {
        match self {
            error if error.is_user_error() => Alert::error("Invalid input", &error.to_string())
                .into_response_with_status(StatusCode::UNPROCESSABLE_ENTITY),
            Error::NotFound | Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                Alert::error(
                    "Transaction not found",
                    "The transaction could not be found. \
                    Try refreshing the page to see if it has already been deleted.",
                )
                .into_response_with_status(StatusCode::NOT_FOUND)
            }
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::ConfigIo { path, reason } => Alert::error(
                "Could not save settings",
                &format!("Writing \"{path}\" failed: {reason}"),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred. Try again later or check the server logs.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

//! Ledger is a REST API for recording financial transactions and querying
//! dashboard aggregates over them.
//!
//! The library is split into a storage layer ([stores]), read-only
//! aggregate views ([Dashboard]) and a thin JSON over HTTP layer
//! ([build_router]).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod dashboard;
mod db;
pub mod endpoints;
mod logging;
pub mod models;
mod not_found;
mod pagination;
mod response;
mod routes;
mod routing;
mod state;
pub mod stores;
mod timezone;

pub use dashboard::{Dashboard, DashboardReport, TransactionSummary};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_BUFFER_LIMIT, LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use response::{ApiResponse, ResponseStatus};
pub use routing::build_router;
pub use state::AppState;
pub use timezone::get_local_offset;

use crate::response::render;

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
///
/// The display text of each variant is the message sent to the client.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The ID in the request path is not an integer.
    #[error("Invalid transaction ID")]
    InvalidTransactionId,

    /// The request body is missing a required field.
    #[error("Invalid request body")]
    InvalidRequestBody,

    /// The request body could not be parsed as the expected JSON object.
    ///
    /// Holds the message from the JSON parser.
    #[error("{0}")]
    InvalidJson(String),

    /// A status other than `pending`, `success` or `failed` was given.
    #[error("Invalid status value. Allowed values: success, pending, failed")]
    InvalidStatus,

    /// The requested transaction does not exist.
    ///
    /// Internally, this error may occur when a query returns no rows or when
    /// an update or delete affected no rows.
    #[error("Transaction not found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("{0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the lock on the store.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A timezone name could not be resolved to a UTC offset.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
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

impl Error {
    /// The HTTP status code that the error maps to.
    ///
    /// Client mistakes are 400, missing transactions are 404 and everything
    /// else is a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidTransactionId
            | Error::InvalidRequestBody
            | Error::InvalidJson(_)
            | Error::InvalidStatus => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::DatabaseLockError | Error::InvalidTimezoneError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        render(status_code, ApiResponse::error(&self.to_string()))
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn maps_no_rows_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn status_codes() {
        let cases = [
            (Error::InvalidTransactionId, StatusCode::BAD_REQUEST),
            (Error::InvalidRequestBody, StatusCode::BAD_REQUEST),
            (Error::InvalidJson("oops".to_owned()), StatusCode::BAD_REQUEST),
            (Error::InvalidStatus, StatusCode::BAD_REQUEST),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (Error::DatabaseLockError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::SqlError(rusqlite::Error::InvalidQuery),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, want) in cases {
            let message = error.to_string();
            let got = error.into_response().status();
            assert_eq!(got, want, "got {got} for \"{message}\", want {want}");
        }
    }

    #[test]
    fn status_message_lists_allowed_values() {
        assert_eq!(
            Error::InvalidStatus.to_string(),
            "Invalid status value. Allowed values: success, pending, failed"
        );
    }
}

//! Hisab is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording income and expense
//! transactions, plus the reporting engine that turns a user's transactions
//! into summary totals, category breakdowns, a daily spending trend and
//! plain-text insights.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod db;
pub mod endpoints;
mod logging;
mod password;
pub mod report;
mod routing;
mod timezone;
pub mod transaction;
mod user;

pub use app_state::{AppState, DEFAULT_CURRENCY_SYMBOL, DEFAULT_TOKEN_DURATION};
pub use auth::{Claims, JwtKeys};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use timezone::LocalTime;
pub use user::{NewUser, User, UserID, create_user, get_user_by_email, get_user_by_id};

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
    /// The email or password did not match a registered user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A required field in a request body was missing or empty.
    ///
    /// The string describes which fields are required.
    #[error("{0}")]
    MissingFields(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email used to register already belongs to another user.
    #[error("a user with that email already exists")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created for a user.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The request did not include a bearer token.
    #[error("no token provided")]
    MissingToken,

    /// The bearer token was malformed, had an invalid signature or has expired.
    #[error("invalid token")]
    InvalidToken,

    /// The transaction in a request body failed validation.
    ///
    /// The string explains which field was rejected.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found so that
    /// clients cannot tell whether they exist.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
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
        let (status, message) = match self {
            Error::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid credentials.".to_owned())
            }
            Error::MissingFields(message) => (StatusCode::BAD_REQUEST, message),
            Error::TooWeak(feedback) => (
                StatusCode::BAD_REQUEST,
                format!("Password is too weak. {feedback}"),
            ),
            Error::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "User already exists with that email.".to_owned(),
            ),
            Error::MissingToken => (StatusCode::UNAUTHORIZED, "No token provided".to_owned()),
            Error::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_owned()),
            Error::InvalidTransaction(reason) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid transaction: {reason}"),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource could not be found.".to_owned(),
            ),
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                (StatusCode::NOT_FOUND, "Transaction not found".to_owned())
            }
            Error::InvalidTimezoneError(timezone) => {
                tracing::error!(
                    "Could not get local timezone \"{timezone}\". Check the server settings."
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_owned())
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_owned())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

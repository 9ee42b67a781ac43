//! Tradebook is a bookkeeping backend for a trading business.
//!
//! This library provides a REST API that serves JSON for recording starting capital, the materials
//! being traded, customers, expenses and the purchases, sales and customer payments (transactions)
//! that make up the ledger.

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
mod customer;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod json;
mod logging;
mod material;
mod not_found;
mod path;
mod password;
mod routing;
mod starting_capital;
mod transaction;
mod user;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use customer::{Customer, NewCustomer, create_customer};
pub use database_id::DatabaseID;
pub use db::initialize as initialize_db;
pub use expense::{Expense, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use material::{Material, NewMaterial, create_material};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use starting_capital::{NewStartingCapital, StartingCapital, create_starting_capital};
pub use transaction::{
    NewTransaction, Transaction, TransactionDraft, TransactionType, create_transaction,
    validate_transaction,
};
pub use user::{User, UserID, create_user, get_user_by_username, update_password};
pub use validation::FieldErrors;

use crate::not_found::get_404_not_found_response;

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
    /// The username or password used to log in was incorrect.
    ///
    /// Deliberately does not say which of the two was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request to a protected route did not include a bearer token.
    #[error("authentication credentials were not provided")]
    MissingToken,

    /// The bearer token could not be decoded, has expired, or is not the
    /// type of token the route expects.
    #[error("the token is invalid or has expired")]
    InvalidToken,

    /// An unexpected error occurred while signing a token.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The user provided a password that is too easy to guess when
    /// resetting it from the command line.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// One or more submitted fields failed validation.
    #[error("invalid fields: {0}")]
    InvalidFields(FieldErrors),

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// A material with the same name already exists.
    #[error("a material with this name already exists")]
    DuplicateMaterialName,

    /// A customer with the same name already exists.
    #[error("a customer with this name already exists")]
    DuplicateCustomerName,

    /// A user with the same username already exists.
    #[error("a user with this username already exists")]
    DuplicateUsername,

    /// A write referenced a material or customer that does not exist.
    #[error("a referenced record does not exist")]
    InvalidForeignKey,

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

    /// A response body could not be read for logging.
    #[error("could not read the response body: {0}")]
    ResponseBodyError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("material.name") =>
            {
                Error::DuplicateMaterialName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("customer.name") =>
            {
                Error::DuplicateCustomerName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::InvalidForeignKey
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
        match self {
            Error::InvalidCredentials => {
                detail_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            Error::MissingToken => detail_response(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            Error::InvalidToken => detail_response(
                StatusCode::UNAUTHORIZED,
                "Given token not valid for any token type",
            ),
            Error::InvalidFields(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Error::MalformedBody(message) => detail_response(StatusCode::BAD_REQUEST, &message),
            Error::DuplicateMaterialName => conflict_response(
                "name",
                "material with this name already exists.",
            ),
            Error::DuplicateCustomerName => conflict_response(
                "name",
                "customer with this name already exists.",
            ),
            Error::DuplicateUsername => conflict_response(
                "username",
                "A user with that username already exists.",
            ),
            Error::InvalidForeignKey => detail_response(
                StatusCode::BAD_REQUEST,
                "A referenced material or customer does not exist.",
            ),
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// A response with a JSON body of the form `{"detail": "..."}`.
fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn conflict_response(field: &str, message: &str) -> Response {
    (
        StatusCode::CONFLICT,
        Json(FieldErrors::single(field, message)),
    )
        .into_response()
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::{Error, FieldErrors};

    async fn body_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (status, serde_json::from_slice(&body).expect("Body is not JSON"))
    }

    #[tokio::test]
    async fn invalid_credentials_is_generic_401() {
        let (status, body) = body_json(Error::InvalidCredentials).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn field_errors_are_keyed_by_field() {
        let errors = FieldErrors::single("name", "This field is required.");

        let (status, body) = body_json(Error::InvalidFields(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"name": ["This field is required."]}));
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let (status, body) = body_json(Error::DuplicateMaterialName).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({"name": ["material with this name already exists."]})
        );
    }

    #[tokio::test]
    async fn unexpected_errors_hide_details() {
        let (status, body) = body_json(Error::HashingError("salt exploded".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Internal server error"}));
    }
}

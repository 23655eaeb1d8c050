//! Unified error types for the service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Postal-code lookup errors.
///
/// An unknown CEP is not an error: the provider answering "not found" is
/// reported as [`crate::lookup::LookupOutcome::NotFound`].
#[derive(Error, Debug)]
pub enum LookupError {
    /// The CEP is not eight digits (optionally `NNNNN-NNN`).
    #[error("malformed CEP: {0:?}")]
    InvalidCep(String),

    /// Failed to build the HTTP client.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),

    /// The request never produced a response.
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider could not be reached.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with a body we could not decode.
    #[error("failed to parse provider response: {0}")]
    ParseError(String),
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record in {table}")]
    Duplicate {
        /// Table that rejected the row.
        table: &'static str,
    },

    /// A CHECK or NOT NULL constraint rejected the write.
    #[error("constraint violated in {table}: {reason}")]
    Constraint {
        /// Table that rejected the row.
        table: &'static str,
        /// Message from the database.
        reason: String,
    },

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a driver error raised while writing to `table`.
    pub fn classify(table: &'static str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Duplicate { table },
            sqlx::Error::Database(db) if db.is_check_violation() => Self::Constraint {
                table,
                reason: db.message().to_string(),
            },
            _ => Self::Database(err),
        }
    }
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable message.
    pub message: String,
}

/// An error already mapped to its HTTP status.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Status to answer with.
    pub status: StatusCode,
    /// Message placed in the body.
    pub message: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 409 Conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

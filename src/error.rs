//! Error taxonomy for the thermal monitoring service.
//!
//! - [`ValidationError`]: the client payload broke one or more field rules.
//!   Always carries every offending field, never just the first.
//! - [`StorageError`]: the store rejected or failed an operation.
//! - [`ApiError`]: what a request handler returns; owns the mapping onto HTTP
//!   status codes and response bodies.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

// ---

/// One violated rule on one payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears on the wire (camelCase).
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Rejection of a payload, listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Build from collected field errors, ordered by field name.
    ///
    /// Callers only construct this when at least one rule failed.
    pub fn new(mut errors: Vec<FieldError>) -> Self {
        // ---
        errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
        errors.dedup();
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }
}

#[cfg(test)]
impl ValidationError {
    // ---
    /// True if any error was reported against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages reported against `field`.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ---

/// Failure of a store operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate key violates unique constraint {}", .constraint.as_deref().unwrap_or("<unknown>"))]
    DuplicateKey { constraint: Option<String> },

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store unavailable: {0}")]
    Connection(String),

    #[error("store operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        // ---
        use sqlx::error::ErrorKind;

        match err {
            // query_canceled: the server hit `statement_timeout`
            sqlx::Error::Database(db) if db.code().as_deref() == Some("57014") => {
                StorageError::Timeout
            }
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation => StorageError::DuplicateKey {
                    constraint: db.constraint().map(String::from),
                },
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StorageError::Constraint(db.message().to_string()),
                _ => StorageError::Database(db.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => StorageError::Timeout,
            sqlx::Error::Io(e) => StorageError::Connection(e.to_string()),
            sqlx::Error::Tls(e) => StorageError::Connection(e.to_string()),
            sqlx::Error::PoolClosed => StorageError::Connection("connection pool closed".into()),
            other => StorageError::Database(other.to_string()),
        }
    }
}

// ---

/// Error returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, body) = match self {
            ApiError::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation_failed", "detail": e.errors }),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "bad_request", "message": message }),
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({ "error": "conflict", "message": message }),
            ),
            ApiError::Storage(StorageError::DuplicateKey { constraint }) => {
                tracing::warn!("Duplicate key on constraint {:?}", constraint);
                (
                    StatusCode::CONFLICT,
                    json!({ "error": "conflict", "message": "resource already exists" }),
                )
            }
            ApiError::Storage(StorageError::Timeout) => {
                tracing::error!("Store operation timed out");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "storage_timeout", "message": "the data store did not respond in time" }),
                )
            }
            ApiError::Storage(e) => {
                tracing::error!("Store operation failed: {}", e);
                internal_error_body()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                internal_error_body()
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_error_body() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "internal_error", "message": "internal server error" }),
    )
}

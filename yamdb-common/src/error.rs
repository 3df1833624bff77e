//! Common error types for the YaMDb service
//!
//! Every failure a request can hit maps onto exactly one variant here, and
//! each variant maps onto a distinct HTTP status so callers can tell them
//! apart programmatically. None of these are fatal to the process - each is
//! scoped to the single request that raised it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Common result type for YaMDb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the YaMDb service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input, reported per field
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Uniqueness violation (duplicate slug, duplicate review, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No (or invalid) credentials on a request that requires them
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated principal disallowed by the permission matrix
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Confirmation code mismatch at token exchange. Deliberately carries
    /// no detail about which side of the comparison was wrong.
    #[error("Invalid confirmation code")]
    InvalidCredentials,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Per-field validation failures, accumulated before any mutation runs
#[derive(Debug, Clone, Default)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against a named field
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push((field.to_string(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok(()) when no failures were recorded, otherwise Error::Validation
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }

    /// Group messages by field, DRF-style: {"field": ["msg", ...]}
    fn grouped(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, message) in &self.errors {
            map.entry(field.clone()).or_default().push(message.clone());
        }
        map
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Single-field convenience constructor
impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        Error::Validation(errors)
    }

    /// True when a sqlx error is a store-level UNIQUE constraint violation.
    /// The repository leans on this to turn racing duplicate inserts into
    /// Conflict instead of read-then-write checks.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields.grouped())).into_response()
            }
            Error::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorBody { error: message })).into_response()
            }
            Error::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(ErrorBody { error: message })).into_response()
            }
            Error::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorBody { error: message })).into_response()
            }
            Error::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: message })).into_response()
            }
            Error::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "Invalid confirmation code".to_string(),
                }),
            )
                .into_response(),
            Error::Database(err) => {
                tracing::error!("Database error: {}", err);
                internal_response()
            }
            Error::Io(err) => {
                tracing::error!("IO error: {}", err);
                internal_response()
            }
            Error::Config(message) | Error::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                internal_response()
            }
        }
    }
}

fn internal_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_and_group() {
        let mut errors = FieldErrors::new();
        errors.push("username", "too long");
        errors.push("username", "bad charset");
        errors.push("email", "too long");

        let grouped = errors.grouped();
        assert_eq!(grouped["username"].len(), 2);
        assert_eq!(grouped["email"], vec!["too long".to_string()]);
    }

    #[test]
    fn empty_field_errors_convert_to_ok() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.push("score", "out of range");
        assert!(matches!(
            errors.into_result(),
            Err(Error::Validation(_))
        ));
    }
}

//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! process-level failures, and `ServiceError` for the failures a request
//! handler reports back to the client.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use travel_planner_core::{validation::ValidationError, PortError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error raised while applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Every failure a handler can report. Rendered as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Nickname already exists")]
    DuplicateNickname,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("{0} not found")]
    ScheduleNotFound(&'static str),
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Deduction must be a non-negative integer")]
    InvalidDeduction,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InternalError(String),
    #[error("Resource not found")]
    NotFound,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingFields
            | ServiceError::DuplicateUsername
            | ServiceError::DuplicateNickname
            | ServiceError::InvalidRating
            | ServiceError::InvalidDeduction
            | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::UserNotFound
            | ServiceError::ScheduleNotFound(_)
            | ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a storage failure that is not a domain rule onto a response.
    pub fn internal(err: PortError) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidRating => ServiceError::InvalidRating,
            ValidationError::InvalidDeduction => ServiceError::InvalidDeduction,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

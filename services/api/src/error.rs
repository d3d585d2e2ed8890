//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! onto HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use workout_tracker_core::ServiceError;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core services.
    #[error("Service Error: {0}")]
    Service(#[from] ServiceError),

    /// The `Authorization` header is present but not `Bearer <token>`.
    #[error("Invalid Authorization header")]
    InvalidCredentialFormat,

    /// The bearer token is unknown, expired or could not be checked.
    #[error("Invalid or expired token")]
    InvalidOrExpiredCredential,

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::JsonDataError(_) => {
                "Request body is missing a required field or has a field of the wrong type"
            }
            _ => "Invalid request body",
        };
        ApiError::Service(ServiceError::Validation(message.to_string()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameters");
        ApiError::Service(ServiceError::Validation(
            "Invalid path parameter".to_string(),
        ))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    error: &'static str,
}

impl ApiError {
    /// Status code, stable error kind, and the message safe to show a client.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Service(e) => match e {
                ServiceError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "validation_failed", msg.clone())
                }
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
                ServiceError::AuthenticationRequired => (
                    StatusCode::UNAUTHORIZED,
                    "authentication_required",
                    "Authentication required".to_string(),
                ),
                ServiceError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "invalid_credentials",
                    "Invalid username or password".to_string(),
                ),
                ServiceError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
                ServiceError::Storage(_) => internal(),
            },
            ApiError::InvalidCredentialFormat => (
                StatusCode::UNAUTHORIZED,
                "invalid_credential_format",
                "Invalid Authorization header".to_string(),
            ),
            ApiError::InvalidOrExpiredCredential => (
                StatusCode::UNAUTHORIZED,
                "invalid_or_expired_token",
                "Invalid or expired token".to_string(),
            ),
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Migration(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            message,
            error,
        };
        (status, Json(body)).into_response()
    }
}

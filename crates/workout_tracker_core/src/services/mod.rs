//! crates/workout_tracker_core/src/services/mod.rs
//!
//! Handler logic that sits between the HTTP layer and the storage ports.

pub mod accounts;
pub mod workouts;

pub use accounts::AccountService;
pub use workouts::WorkoutService;

use crate::credential::CredentialError;
use crate::domain::{Identity, User};
use crate::ports::PortError;
use crate::token::TokenError;

/// Failure kinds surfaced by the services. Each maps to one stable external status.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Authentication required")]
    AuthenticationRequired,
    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<PortError> for ServiceError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => ServiceError::NotFound(msg),
            PortError::Conflict(msg) => ServiceError::Conflict(msg),
            PortError::Unexpected(msg) => ServiceError::Storage(msg),
        }
    }
}

impl From<CredentialError> for ServiceError {
    fn from(e: CredentialError) -> Self {
        ServiceError::Storage(e.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Store(port) => port.into(),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

/// Returns the authenticated user or `AuthenticationRequired`.
pub fn require_user(identity: &Identity) -> ServiceResult<&User> {
    identity.user().ok_or(ServiceError::AuthenticationRequired)
}

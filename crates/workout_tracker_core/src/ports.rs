//! crates/workout_tracker_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete relational store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::credential::Password;
use crate::domain::{NewUser, User, Workout};
use crate::token::Token;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness or check constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user_by_name(&self, username: &str) -> PortResult<Option<User>>;

    /// Writes username, email and bio, refreshing `updated_at`.
    /// Fails with `NotFound` when no row has `user.id`.
    async fn update_user(&self, user: &User) -> PortResult<User>;

    async fn update_password(&self, user_id: i64, password: &Password) -> PortResult<()>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists the digest, owner, scope and expiry. The plaintext is never stored.
    async fn insert_token(&self, token: &Token) -> PortResult<()>;

    /// Deletes every token for `(user_id, scope)`. Deleting nothing is not an error.
    async fn delete_all_tokens(&self, user_id: i64, scope: &str) -> PortResult<()>;

    /// Returns the owner of the token with this digest and scope, provided it
    /// expires after `now`.
    async fn find_user_by_token(
        &self,
        scope: &str,
        digest: &[u8],
        now: DateTime<Utc>,
    ) -> PortResult<Option<User>>;
}

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Inserts the header and every entry atomically; returns the workout with
    /// assigned ids and entries sorted by order index.
    async fn create_workout(&self, workout: &Workout) -> PortResult<Workout>;

    async fn get_workout_by_id(&self, id: i64) -> PortResult<Option<Workout>>;

    /// Updates the header and replaces the full entry list in one transaction.
    async fn update_workout(&self, workout: &Workout) -> PortResult<Workout>;

    /// Deletes the workout and, with it, all of its entries.
    async fn delete_workout(&self, id: i64) -> PortResult<()>;

    async fn get_workout_owner(&self, id: i64) -> PortResult<Option<i64>>;
}

//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the storage ports from the `core` crate. It handles all interactions with
//! the PostgreSQL database using `sqlx`. The workout aggregate lives in
//! `adapters::workouts`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use workout_tracker_core::credential::Password;
use workout_tracker_core::domain::{NewUser, User};
use workout_tracker_core::ports::{PortError, PortResult, TokenStore, UserStore};
use workout_tracker_core::token::Token;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements `UserStore`, `TokenStore` and `WorkoutStore`.
#[derive(Clone)]
pub struct DbAdapter {
    pub(crate) pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Constraint violations become `Conflict`; everything else is unexpected.
pub(crate) fn map_db_error(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation()
            || db_err.is_check_violation()
            || db_err.is_foreign_key_violation()
        {
            return PortError::Conflict(db_err.message().to_string());
        }
    }
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    bio: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password: Password::from_hash(self.password_hash),
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn password_hash(password: &Password) -> PortResult<&str> {
    password
        .hash()
        .ok_or_else(|| PortError::Unexpected("refusing to store a user without a password".to_string()))
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, email, password_hash, bio) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, password_hash, bio, created_at, updated_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash(&user.password)?)
        .bind(&user.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_name(&self, username: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password_hash, bio, created_at, updated_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn update_user(&self, user: &User) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET username = $1, email = $2, bio = $3, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $4 \
             RETURNING id, username, email, password_hash, bio, created_at, updated_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.bio)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        record
            .map(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user.id)))
    }

    async fn update_password(&self, user_id: i64, password: &Password) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(password_hash(password)?)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `TokenStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl TokenStore for DbAdapter {
    async fn insert_token(&self, token: &Token) -> PortResult<()> {
        sqlx::query("INSERT INTO tokens (hash, user_id, expired, scope) VALUES ($1, $2, $3, $4)")
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(&token.scope)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn delete_all_tokens(&self, user_id: i64, scope: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
            .bind(scope)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        debug!(user_id, scope, deleted = result.rows_affected(), "Deleted tokens");
        Ok(())
    }

    async fn find_user_by_token(
        &self,
        scope: &str,
        digest: &[u8],
        now: DateTime<Utc>,
    ) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT u.id, u.username, u.email, u.password_hash, u.bio, u.created_at, u.updated_at \
             FROM users u INNER JOIN tokens t ON t.user_id = u.id \
             WHERE t.hash = $1 AND t.scope = $2 AND t.expired > $3",
        )
        .bind(digest)
        .bind(scope)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(UserRecord::to_domain))
    }
}

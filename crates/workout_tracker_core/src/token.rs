//! crates/workout_tracker_core/src/token.rs
//!
//! Opaque bearer tokens. The plaintext is handed to the caller once; only its
//! SHA-256 digest is persisted.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::domain::User;
use crate::ports::{PortError, TokenStore};

/// Scope of tokens issued by a successful login.
pub const SCOPE_AUTHENTICATION: &str = "authentication";

const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to generate random token: {0}")]
    Random(String),
    #[error("Token lifetime is out of range")]
    LifetimeOutOfRange,
    #[error(transparent)]
    Store(#[from] PortError),
}

/// A freshly generated token.
#[derive(Clone)]
pub struct Token {
    /// Shown to the caller exactly once.
    pub plaintext: String,
    pub hash: Vec<u8>,
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("user_id", &self.user_id)
            .field("expiry", &self.expiry)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Deterministic digest of a presented plaintext token.
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Generates 256 random bits, encodes them URL-safe, and digests the result.
pub fn generate_token(user_id: i64, ttl: Duration, scope: &str) -> Result<Token, TokenError> {
    let expiry = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(TokenError::LifetimeOutOfRange)?;

    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TokenError::Random(e.to_string()))?;

    let plaintext = URL_SAFE_NO_PAD.encode(bytes);
    let hash = hash_token(&plaintext);

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expiry,
        scope: scope.to_string(),
    })
}

/// Issues, validates and bulk-revokes tokens against a `TokenStore`.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
}

impl TokenService {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub async fn issue(&self, user_id: i64, ttl: Duration, scope: &str) -> Result<Token, TokenError> {
        let token = generate_token(user_id, ttl, scope)?;
        self.store.insert_token(&token).await?;
        debug!(user_id, scope, expiry = %token.expiry, "Issued token");
        Ok(token)
    }

    /// Resolves a presented plaintext to its owner. Unknown and expired tokens
    /// both yield `Ok(None)`.
    pub async fn validate(&self, scope: &str, plaintext: &str) -> Result<Option<User>, TokenError> {
        let digest = hash_token(plaintext);
        Ok(self
            .store
            .find_user_by_token(scope, &digest, Utc::now())
            .await?)
    }

    pub async fn invalidate_all(&self, user_id: i64, scope: &str) -> Result<(), TokenError> {
        self.store.delete_all_tokens(user_id, scope).await?;
        debug!(user_id, scope, "Invalidated tokens");
        Ok(())
    }
}

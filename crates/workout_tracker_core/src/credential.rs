//! crates/workout_tracker_core/src/credential.rs
//!
//! Password hashing and verification for a user identity.
//!
//! Only the argon2 PHC string is ever kept. Verification goes through argon2's
//! own verifier, which compares digests in constant time.

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),
    #[error("Failed to verify password: {0}")]
    Verification(String),
    #[error("No password has been set")]
    NotSet,
}

/// A salted, adaptive digest of a user's password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password {
    hash: Option<String>,
}

impl Password {
    /// Wraps a digest loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self {
            hash: Some(hash.into()),
        }
    }

    /// Hashes `plaintext` and returns the resulting password.
    pub fn hashed(plaintext: &str) -> Result<Self, CredentialError> {
        let mut password = Self::default();
        password.set(plaintext)?;
        Ok(password)
    }

    /// The PHC-formatted digest, if one has been set.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Replaces the stored digest with a fresh salted hash of `plaintext`.
    pub fn set(&mut self, plaintext: &str) -> Result<(), CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();
        self.hash = Some(hash);
        Ok(())
    }

    /// Returns `Ok(false)` on a plain mismatch. Errors are reserved for a
    /// digest that cannot be parsed or a failure inside argon2.
    pub fn check(&self, candidate: &str) -> Result<bool, CredentialError> {
        let hash = self.hash.as_deref().ok_or(CredentialError::NotSet)?;
        let parsed =
            PasswordHash::new(hash).map_err(|e| CredentialError::Verification(e.to_string()))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Verification(e.to_string())),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.hash.is_some() { "<redacted>" } else { "<unset>" };
        f.debug_struct("Password").field("hash", &state).finish()
    }
}

//! crates/workout_tracker_core/src/services/accounts.rs
//!
//! Registration, login, profile updates and credential rotation.

use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

use super::{require_user, ServiceError, ServiceResult};
use crate::credential::Password;
use crate::domain::{Identity, NewAccount, NewUser, ProfilePatch, User};
use crate::ports::UserStore;
use crate::token::{Token, TokenService, SCOPE_AUTHENTICATION};
use crate::validation;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    token_ttl: Duration,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService, token_ttl: Duration) -> Self {
        Self {
            users,
            tokens,
            token_ttl,
        }
    }

    pub async fn register(&self, account: NewAccount) -> ServiceResult<User> {
        validation::validate_new_account(&account).map_err(ServiceError::Validation)?;

        let password = Password::hashed(&account.password)?;
        let user = self
            .users
            .create_user(NewUser {
                username: account.username,
                email: account.email,
                password,
                bio: account.bio,
            })
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("username or email already taken".to_string())
                }
                other => other,
            })?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Verifies the password and issues an authentication token.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<Token> {
        let user = match self.users.get_user_by_name(username).await? {
            Some(user) => user,
            None => {
                warn!(username, "Login attempt for unknown user");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !user.password.check(password)? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id, self.token_ttl, SCOPE_AUTHENTICATION)
            .await?;
        info!(user_id = user.id, "User authenticated");
        Ok(token)
    }

    /// Updates the caller's own profile. There is no way to target another user.
    pub async fn update_profile(&self, identity: &Identity, patch: ProfilePatch) -> ServiceResult<User> {
        let mut user = require_user(identity)?.clone();

        if let Some(username) = patch.username {
            validation::validate_username(&username).map_err(ServiceError::Validation)?;
            user.username = username;
        }
        if let Some(email) = patch.email {
            validation::validate_email(&email).map_err(ServiceError::Validation)?;
            user.email = email;
        }
        if let Some(bio) = patch.bio {
            user.bio = bio;
        }

        let updated = self.users.update_user(&user).await?;
        info!(user_id = updated.id, "Updated user profile");
        Ok(updated)
    }

    /// Rotates the caller's password and revokes every authentication token
    /// they hold, including the one used for this request.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current: &str,
        new: &str,
    ) -> ServiceResult<()> {
        let user = require_user(identity)?;

        if !user.password.check(current)? {
            return Err(ServiceError::InvalidCredentials);
        }
        validation::validate_password(new).map_err(ServiceError::Validation)?;

        let password = Password::hashed(new)?;
        self.users.update_password(user.id, &password).await?;
        self.tokens
            .invalidate_all(user.id, SCOPE_AUTHENTICATION)
            .await?;

        info!(user_id = user.id, "Password changed; authentication tokens revoked");
        Ok(())
    }

    pub async fn logout(&self, identity: &Identity) -> ServiceResult<()> {
        let user = require_user(identity)?;
        self.tokens
            .invalidate_all(user.id, SCOPE_AUTHENTICATION)
            .await?;
        info!(user_id = user.id, "User logged out");
        Ok(())
    }
}

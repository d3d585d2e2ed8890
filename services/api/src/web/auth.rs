//! services/api/src/web/auth.rs
//!
//! Account endpoints: registration, login, logout, profile and password changes.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use workout_tracker_core::{NewAccount, ProfilePatch, User};

use crate::error::ApiError;
use crate::web::middleware::CurrentIdentity;
use crate::web::response;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The public view of a user. Never carries the password digest.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub bio: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    /// The bearer token. It cannot be retrieved again.
    pub token: String,
    pub expiry: DateTime<Utc>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /users - Create a new user account
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid user data"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user = state
        .accounts
        .register(NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            bio: req.bio,
        })
        .await?;

    Ok(response::created(
        "User successfully created",
        UserResponse::from(user),
    ))
}

/// POST /tokens/authentication - Exchange a username and password for a bearer token
#[utoipa::path(
    post,
    path = "/tokens/authentication",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token created successfully", body = TokenResponse),
        (status = 401, description = "Invalid username or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let token = state
        .accounts
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(response::created(
        "Token created successfully",
        TokenResponse {
            token: token.plaintext,
            expiry: token.expiry,
        },
    ))
}

/// DELETE /tokens/authentication - Revoke every authentication token of the caller
#[utoipa::path(
    delete,
    path = "/tokens/authentication",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<impl IntoResponse, ApiError> {
    state.accounts.logout(&identity).await?;
    Ok(response::message("Logged out"))
}

/// PUT /users/me - Update the caller's own profile
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "User successfully updated", body = UserResponse),
        (status = 400, description = "Invalid user data"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("bearer" = []))
)]
pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user = state
        .accounts
        .update_profile(
            &identity,
            ProfilePatch {
                username: req.username,
                email: req.email,
                bio: req.bio,
            },
        )
        .await?;

    Ok(response::success(
        "User successfully updated",
        UserResponse::from(user),
    ))
}

/// PUT /users/me/password - Rotate the caller's password
///
/// Every authentication token of the caller is revoked, including the one
/// used to make this request.
#[utoipa::path(
    put,
    path = "/users/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password is invalid"),
        (status = 401, description = "Authentication required or wrong current password")
    ),
    security(("bearer" = []))
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    state
        .accounts
        .change_password(&identity, &req.current_password, &req.new_password)
        .await?;
    Ok(response::message("Password changed; please log in again"))
}

//! services/api/src/web/middleware.rs
//!
//! Authentication middleware and the request identity extractor.
//!
//! `authenticate` runs on every route and resolves the bearer token into an
//! `Identity`; `require_user` guards the routes that need a signed-in caller.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;
use workout_tracker_core::{Identity, ServiceError, SCOPE_AUTHENTICATION};

use crate::error::ApiError;
use crate::web::state::AppState;

/// Extracts the token from an `Authorization` header.
///
/// A missing or empty header is `Ok(None)`. Anything other than exactly
/// `Bearer <token>` is `InvalidCredentialFormat`.
pub fn parse_bearer(value: Option<&HeaderValue>) -> Result<Option<String>, ApiError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| ApiError::InvalidCredentialFormat)?;
    if raw.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = raw.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(Some((*token).to_string())),
        _ => Err(ApiError::InvalidCredentialFormat),
    }
}

/// Middleware that resolves the caller's identity and inserts it into the
/// request extensions for everything downstream.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = match resolve(&state, req, next).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve(state: &AppState, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = match parse_bearer(req.headers().get(header::AUTHORIZATION))? {
        None => Identity::Anonymous,
        Some(token) => match state.tokens.validate(SCOPE_AUTHENTICATION, &token).await {
            Ok(Some(user)) => Identity::Authenticated(user),
            Ok(None) => return Err(ApiError::InvalidOrExpiredCredential),
            Err(e) => {
                error!(error = %e, "Token validation failed");
                return Err(ApiError::InvalidOrExpiredCredential);
            }
        },
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Rejects anonymous callers with `AuthenticationRequired`.
pub async fn require_user(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<Identity>() {
        Some(Identity::Authenticated(_)) => Ok(next.run(req).await),
        Some(Identity::Anonymous) => Err(ServiceError::AuthenticationRequired.into()),
        None => Err(missing_identity()),
    }
}

/// The identity resolved by `authenticate` for this request.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(missing_identity)
    }
}

// Reaching a handler without an identity means the router was assembled
// without `authenticate`. Never treat that as anonymous.
fn missing_identity() -> ApiError {
    error!("Request identity missing; authenticate middleware is not installed");
    ApiError::Internal("request identity missing".to_string())
}

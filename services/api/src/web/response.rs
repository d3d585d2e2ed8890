//! services/api/src/web/response.rs
//!
//! The success envelope shared by every JSON handler. Errors are rendered by
//! `ApiError`'s `IntoResponse` impl in the same shape.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

pub fn success<T: Serialize>(message: &str, data: T) -> EnvelopeResponse<T> {
    respond(StatusCode::OK, message, Some(data))
}

pub fn created<T: Serialize>(message: &str, data: T) -> EnvelopeResponse<T> {
    respond(StatusCode::CREATED, message, Some(data))
}

/// A success envelope without a `data` member.
pub fn message(message: &str) -> EnvelopeResponse<()> {
    respond(StatusCode::OK, message, None)
}

fn respond<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> EnvelopeResponse<T> {
    debug!(status = status.as_u16(), message, "Sending response");
    (
        status,
        Json(Envelope {
            success: true,
            message: message.to_string(),
            data,
        }),
    )
}

//! Authentication tests through the full router.
//!
//! These tests verify that:
//! 1. Registration never echoes the password digest
//! 2. Login hands out a URL-safe bearer token exactly once
//! 3. The middleware distinguishes missing, malformed, unknown and expired tokens
//! 4. Logout and password rotation revoke outstanding tokens

use axum::http::{header, Method, StatusCode};
use chrono::Duration;
use serde_json::json;
use workout_tracker_core::SCOPE_AUTHENTICATION;

mod common;

use common::{create_test_app, login, register, send};

#[tokio::test]
async fn test_health_is_public_and_varies_on_authorization() {
    let (app, _) = create_test_app();

    let response = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(header::VARY).unwrap(),
        "Authorization"
    );
}

#[tokio::test]
async fn test_register_excludes_password_hash() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "longenough1",
            "bio": ""
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    let data = response.body["data"].as_object().unwrap();
    let mut keys: Vec<_> = data.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["bio", "email", "id", "username"]);
    assert_eq!(data["username"], "alice");
    assert!(!response.body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_register_validation_failures() {
    let (app, _) = create_test_app();

    for (body, expected) in [
        (
            json!({"username": "", "email": "a@example.com", "password": "longenough1"}),
            "Username is required",
        ),
        (
            json!({"username": "a", "email": "a@example.com", "password": "short"}),
            "Password must be at least 8 characters long",
        ),
        (
            json!({"username": "a", "email": "not-an-email", "password": "longenough1"}),
            "Invalid email format",
        ),
    ] {
        let response = send(&app, Method::POST, "/users", None, Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "validation_failed");
        assert_eq!(response.body["message"], expected);
    }
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": "alice",
            "email": "someone-else@example.com",
            "password": "longenough1"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "conflict");
}

#[tokio::test]
async fn test_login_returns_url_safe_token() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;

    let response = send(
        &app,
        Method::POST,
        "/tokens/authentication",
        None,
        Some(json!({ "username": "alice", "password": "longenough1" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let token = response.body["data"]["token"].as_str().unwrap();
    assert_eq!(token.len(), 43);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;

    let wrong_password = send(
        &app,
        Method::POST,
        "/tokens/authentication",
        None,
        Some(json!({ "username": "alice", "password": "wrongpassword" })),
    )
    .await;
    let unknown_user = send(
        &app,
        Method::POST,
        "/tokens/authentication",
        None,
        Some(json!({ "username": "mallory", "password": "longenough1" })),
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/workouts",
        None,
        Some(json!({ "title": "Leg Day", "duration": 45, "calories_burned": 400 })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "authentication_required");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let (app, _) = create_test_app();

    for value in ["Token abc", "Bearer", "Bearer a b"] {
        let response = send(&app, Method::GET, "/health", Some(value), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", value);
        assert_eq!(response.body["error"], "invalid_credential_format");
        assert_eq!(
            response.headers.get(header::VARY).unwrap(),
            "Authorization"
        );
    }
}

#[tokio::test]
async fn test_unknown_token_is_rejected_even_on_public_routes() {
    let (app, _) = create_test_app();

    let response = send(&app, Method::GET, "/health", Some("Bearer not-a-real-token"), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_or_expired_token");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, state) = create_test_app();
    let user_id = register(&app, "alice").await;

    let expired = state
        .tokens
        .issue(user_id, Duration::seconds(-1), SCOPE_AUTHENTICATION)
        .await
        .unwrap();

    let response = send(
        &app,
        Method::DELETE,
        "/tokens/authentication",
        Some(&format!("Bearer {}", expired.plaintext)),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_or_expired_token");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;
    let auth = login(&app, "alice").await;

    let response = send(&app, Method::DELETE, "/tokens/authentication", Some(&auth), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let again = send(&app, Method::DELETE, "/tokens/authentication", Some(&auth), None).await;
    assert_eq!(again.status, StatusCode::UNAUTHORIZED);
    assert_eq!(again.body["error"], "invalid_or_expired_token");
}

#[tokio::test]
async fn test_update_own_profile() {
    let (app, _) = create_test_app();
    let alice_id = register(&app, "alice").await;
    let auth = login(&app, "alice").await;

    let response = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(&auth),
        Some(json!({ "bio": "squats daily" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], alice_id);
    assert_eq!(response.body["data"]["bio"], "squats daily");
    assert_eq!(response.body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_profile_update_cannot_steal_username() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;
    register(&app, "bob").await;
    let auth = login(&app, "bob").await;

    let response = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(&auth),
        Some(json!({ "username": "alice" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_password_change_revokes_tokens() {
    let (app, _) = create_test_app();
    register(&app, "alice").await;
    let auth = login(&app, "alice").await;

    let response = send(
        &app,
        Method::PUT,
        "/users/me/password",
        Some(&auth),
        Some(json!({ "current_password": "longenough1", "new_password": "evenlonger2" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let stale = send(&app, Method::PUT, "/users/me", Some(&auth), Some(json!({}))).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let relogin = send(
        &app,
        Method::POST,
        "/tokens/authentication",
        None,
        Some(json!({ "username": "alice", "password": "evenlonger2" })),
    )
    .await;
    assert_eq!(relogin.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_missing_field_is_validation_failure() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "validation_failed");
    assert!(!response.body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_login_with_malformed_json_is_validation_failure() {
    let (app, _) = create_test_app();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/tokens/authentication")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"username\": "))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["message"], "Request body is not valid JSON");
}

#[tokio::test]
async fn test_overlong_username_is_validation_failure() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": "a".repeat(51),
            "email": "long@example.com",
            "password": "longenough1"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation_failed");
    assert_eq!(
        response.body["message"],
        "Username must be at most 50 characters long"
    );
}

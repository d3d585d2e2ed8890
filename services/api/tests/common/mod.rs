use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use workout_tracker_core::memory::InMemoryStore;

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let store = Arc::new(InMemoryStore::new());
    let state = Arc::new(AppState::new(
        &Config::test_default(),
        store.clone(),
        store.clone(),
        store,
    ));
    (build_router(state.clone()), state)
}

/// A decoded response: status, headers and the JSON body (`Null` if the body
/// is not JSON).
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Send one request through the router.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Registers `username` with password `longenough1` and returns the new id.
#[allow(dead_code)]
pub async fn register(app: &Router, username: &str) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "longenough1",
            "bio": ""
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["data"]["id"].as_i64().unwrap()
}

/// Logs in and returns a ready-to-use `Authorization` header value.
#[allow(dead_code)]
pub async fn login(app: &Router, username: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/tokens/authentication",
        None,
        Some(json!({ "username": username, "password": "longenough1" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    format!("Bearer {}", response.body["data"]["token"].as_str().unwrap())
}

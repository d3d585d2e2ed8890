pub mod auth;
pub mod middleware;
pub mod response;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use auth::{
    change_password_handler, login_handler, logout_handler, register_handler, update_me_handler,
};
use middleware::{authenticate, require_user};
use rest::{
    create_workout_handler, delete_workout_handler, get_workout_handler, health_handler,
    update_workout_handler,
};
use state::AppState;

/// Builds the full API router. `authenticate` wraps every route; the
/// protected group additionally requires a signed-in caller.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/users", post(register_handler))
        .route("/tokens/authentication", post(login_handler))
        .route("/workouts/{id}", get(get_workout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/users/me", put(update_me_handler))
        .route("/users/me/password", put(change_password_handler))
        .route("/tokens/authentication", delete(logout_handler))
        .route("/workouts", post(create_workout_handler))
        .route(
            "/workouts/{id}",
            put(update_workout_handler).delete(delete_workout_handler),
        )
        .route_layer(axum_middleware::from_fn(require_user));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

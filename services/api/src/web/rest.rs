//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the workout REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::auth;
use crate::web::middleware::CurrentIdentity;
use crate::web::response;
use crate::web::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use workout_tracker_core::{Workout, WorkoutEntry, WorkoutPatch};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::update_me_handler,
        auth::change_password_handler,
        get_workout_handler,
        create_workout_handler,
        update_workout_handler,
        delete_workout_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UpdateProfileRequest,
            auth::ChangePasswordRequest,
            auth::UserResponse,
            auth::TokenResponse,
            EntryPayload,
            CreateWorkoutRequest,
            UpdateWorkoutRequest,
            WorkoutResponse,
            EntryResponse,
            WorkoutUpdatedResponse,
            WorkoutDeletedResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Workout Tracker API", description = "Users, bearer tokens and workouts.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One exercise line as sent by clients.
#[derive(Deserialize, ToSchema, Clone)]
pub struct EntryPayload {
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub order_index: i32,
}

impl From<EntryPayload> for WorkoutEntry {
    fn from(p: EntryPayload) -> Self {
        WorkoutEntry {
            id: 0,
            exercise_name: p.exercise_name,
            sets: p.sets,
            reps: p.reps,
            duration_seconds: p.duration_seconds,
            weight: p.weight,
            notes: p.notes,
            order_index: p.order_index,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateWorkoutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Minutes.
    pub duration: i32,
    pub calories_burned: i32,
    #[serde(default)]
    pub entries: Vec<EntryPayload>,
}

/// Absent fields are left unchanged; `entries`, when present, replaces the whole list.
#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<EntryPayload>>,
}

impl From<UpdateWorkoutRequest> for WorkoutPatch {
    fn from(req: UpdateWorkoutRequest) -> Self {
        WorkoutPatch {
            title: req.title,
            description: req.description,
            duration_minutes: req.duration,
            calories_burned: req.calories_burned,
            entries: req
                .entries
                .map(|entries| entries.into_iter().map(WorkoutEntry::from).collect()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct EntryResponse {
    pub id: i64,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub weight: Option<f64>,
    pub notes: String,
    pub order_index: i32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct WorkoutResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub calories_burned: i32,
    pub entries: Vec<EntryResponse>,
}

impl From<Workout> for WorkoutResponse {
    fn from(w: Workout) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            title: w.title,
            description: w.description,
            duration: w.duration_minutes,
            calories_burned: w.calories_burned,
            entries: w
                .entries
                .into_iter()
                .map(|e| EntryResponse {
                    id: e.id,
                    exercise_name: e.exercise_name,
                    sets: e.sets,
                    reps: e.reps,
                    duration_seconds: e.duration_seconds,
                    weight: e.weight,
                    notes: e.notes,
                    order_index: e.order_index,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct WorkoutUpdatedResponse {
    pub workout_id: i64,
    pub updated_fields: Vec<String>,
    pub workout: WorkoutResponse,
}

#[derive(Serialize, ToSchema)]
pub struct WorkoutDeletedResponse {
    pub workout_id: i64,
    pub title: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Fetch a workout with its entries in order-index order.
#[utoipa::path(
    get,
    path = "/workouts/{id}",
    params(("id" = i64, Path, description = "Workout id")),
    responses(
        (status = 200, description = "Workout retrieved successfully", body = WorkoutResponse),
        (status = 404, description = "No such workout")
    )
)]
pub async fn get_workout_handler(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let workout = state.workouts.get(id).await?;
    Ok(response::success(
        "Workout retrieved successfully",
        WorkoutResponse::from(workout),
    ))
}

/// Create a workout owned by the caller.
#[utoipa::path(
    post,
    path = "/workouts",
    request_body = CreateWorkoutRequest,
    responses(
        (status = 201, description = "Workout successfully created", body = WorkoutResponse),
        (status = 400, description = "Invalid workout data"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer" = []))
)]
pub async fn create_workout_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let workout = Workout {
        id: 0,
        user_id: 0,
        title: req.title,
        description: req.description,
        duration_minutes: req.duration,
        calories_burned: req.calories_burned,
        entries: req.entries.into_iter().map(WorkoutEntry::from).collect(),
    };

    let created = state.workouts.create(&identity, workout).await?;
    Ok(response::created(
        "Workout successfully created",
        WorkoutResponse::from(created),
    ))
}

/// Partially update a workout. Only its owner may do this.
#[utoipa::path(
    put,
    path = "/workouts/{id}",
    params(("id" = i64, Path, description = "Workout id")),
    request_body = UpdateWorkoutRequest,
    responses(
        (status = 200, description = "Workout successfully updated", body = WorkoutUpdatedResponse),
        (status = 400, description = "Invalid workout data"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller does not own the workout"),
        (status = 404, description = "No such workout")
    ),
    security(("bearer" = []))
)]
pub async fn update_workout_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateWorkoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let Json(req) = body?;
    let updated = state.workouts.update(&identity, id, req.into()).await?;
    Ok(response::success(
        "Workout successfully updated",
        WorkoutUpdatedResponse {
            workout_id: updated.workout.id,
            updated_fields: updated
                .changed_fields
                .iter()
                .map(|f| f.to_string())
                .collect(),
            workout: WorkoutResponse::from(updated.workout),
        },
    ))
}

/// Delete a workout and all of its entries. Only its owner may do this.
#[utoipa::path(
    delete,
    path = "/workouts/{id}",
    params(("id" = i64, Path, description = "Workout id")),
    responses(
        (status = 200, description = "Workout successfully deleted", body = WorkoutDeletedResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Caller does not own the workout"),
        (status = 404, description = "No such workout")
    ),
    security(("bearer" = []))
)]
pub async fn delete_workout_handler(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(identity): CurrentIdentity,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let deleted = state.workouts.delete(&identity, id).await?;
    Ok(response::success(
        "Workout successfully deleted",
        WorkoutDeletedResponse {
            workout_id: deleted.id,
            title: deleted.title,
        },
    ))
}

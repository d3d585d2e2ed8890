//! crates/workout_tracker_core/src/services/workouts.rs
//!
//! Owner-only mutation of workouts.
//!
//! For update and delete the owner is looked up and compared to the caller
//! before the store is asked to change anything. Any failure of that lookup
//! denies the request. Two owners racing on the same workout are resolved by
//! the store's transaction isolation: the last commit wins.

use std::sync::Arc;
use tracing::{info, warn};

use super::{require_user, ServiceError, ServiceResult};
use crate::domain::{Identity, User, Workout, WorkoutPatch};
use crate::ports::WorkoutStore;
use crate::validation;

#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn WorkoutStore>,
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdatedWorkout {
    pub workout: Workout,
    pub changed_fields: Vec<&'static str>,
}

impl WorkoutService {
    pub fn new(store: Arc<dyn WorkoutStore>) -> Self {
        Self { store }
    }

    /// Creates a workout owned by the caller. Any `user_id` on the input is ignored.
    pub async fn create(&self, identity: &Identity, workout: Workout) -> ServiceResult<Workout> {
        let user = require_user(identity)?;
        let workout = Workout {
            id: 0,
            user_id: user.id,
            ..workout
        };
        validation::validate_workout(&workout).map_err(ServiceError::Validation)?;

        let created = self.store.create_workout(&workout).await?;
        info!(
            workout_id = created.id,
            user_id = user.id,
            entries = created.entries.len(),
            "Created workout"
        );
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Workout> {
        self.store
            .get_workout_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Workout with ID {} not found", id)))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        patch: WorkoutPatch,
    ) -> ServiceResult<UpdatedWorkout> {
        let user = require_user(identity)?;
        self.authorize(user, id).await?;

        let mut workout = self.get(id).await?;
        let changed_fields = patch.apply(&mut workout);
        validation::validate_workout(&workout).map_err(ServiceError::Validation)?;

        let workout = self.store.update_workout(&workout).await?;
        info!(workout_id = id, user_id = user.id, fields = ?changed_fields, "Updated workout");
        Ok(UpdatedWorkout {
            workout,
            changed_fields,
        })
    }

    /// Deletes the workout and returns it as it was just before deletion.
    pub async fn delete(&self, identity: &Identity, id: i64) -> ServiceResult<Workout> {
        let user = require_user(identity)?;
        self.authorize(user, id).await?;

        let workout = self.get(id).await?;
        self.store.delete_workout(id).await?;
        info!(workout_id = id, user_id = user.id, "Deleted workout");
        Ok(workout)
    }

    async fn authorize(&self, user: &User, id: i64) -> ServiceResult<()> {
        let owner = self
            .store
            .get_workout_owner(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Workout with ID {} not found", id)))?;

        if owner != user.id {
            warn!(workout_id = id, user_id = user.id, "Rejected mutation by non-owner");
            return Err(ServiceError::Forbidden(format!(
                "User {} is not authorized to modify workout {}",
                user.id, id
            )));
        }
        Ok(())
    }
}

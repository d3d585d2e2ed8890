//! crates/workout_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

use crate::credential::Password;

/// A registered user. The credential digest travels with the record but is
/// never part of any outward representation.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: Password,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Only used when inserting - the store assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Password,
    pub bio: String,
}

/// Who is making a request. Resolved once per request by the auth middleware.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Authenticated(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// A single exercise line inside a workout.
///
/// `order_index` defines the logical position of the entry; storage order and
/// vector position carry no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutEntry {
    /// Assigned by the store. Zero until persisted.
    pub id: i64,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub weight: Option<f64>,
    pub notes: String,
    pub order_index: i32,
}

/// The workout aggregate: a header plus its ordered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    /// Assigned by the store. Zero until persisted.
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub entries: Vec<WorkoutEntry>,
}

impl Workout {
    /// Sorts entries by `order_index`. Stable, so equal indices keep their
    /// relative position.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|e| e.order_index);
    }
}

/// Partial update of a workout. `None` leaves a field unchanged; `Some(entries)`
/// replaces the whole entry list.
#[derive(Debug, Clone, Default)]
pub struct WorkoutPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<WorkoutEntry>>,
}

impl WorkoutPatch {
    /// Applies the patch to `workout` and returns the names of the fields that
    /// were replaced.
    pub fn apply(self, workout: &mut Workout) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(title) = self.title {
            workout.title = title;
            changed.push("title");
        }
        if let Some(description) = self.description {
            workout.description = description;
            changed.push("description");
        }
        if let Some(duration) = self.duration_minutes {
            workout.duration_minutes = duration;
            changed.push("duration");
        }
        if let Some(calories) = self.calories_burned {
            workout.calories_burned = calories;
            changed.push("calories_burned");
        }
        if let Some(entries) = self.entries {
            workout.entries = entries;
            changed.push("entries");
        }
        changed
    }
}

/// Registration input, before validation and hashing.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: String,
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

//! crates/workout_tracker_core/src/memory.rs
//!
//! An in-process implementation of every storage port. It mirrors the
//! relational schema's constraints (unique username/email, one entry per
//! order index, reps xor duration) so services can be exercised without a
//! database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::credential::Password;
use crate::domain::{NewUser, User, Workout, WorkoutEntry};
use crate::ports::{PortError, PortResult, TokenStore, UserStore, WorkoutStore};
use crate::token::Token;

struct StoredToken {
    hash: Vec<u8>,
    user_id: i64,
    expiry: DateTime<Utc>,
    scope: String,
}

#[derive(Default)]
struct Inner {
    last_user_id: i64,
    last_workout_id: i64,
    last_entry_id: i64,
    users: BTreeMap<i64, User>,
    tokens: Vec<StoredToken>,
    workouts: BTreeMap<i64, Workout>,
}

impl Inner {
    fn identity_taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .filter(|u| Some(u.id) != except)
            .any(|u| u.username == username || u.email == email)
    }

    /// Assigns fresh entry ids and sorts by order index, or rejects the list
    /// the way the relational constraints would.
    fn prepare_entries(&mut self, entries: &[WorkoutEntry]) -> PortResult<Vec<WorkoutEntry>> {
        let mut seen = HashSet::new();
        for entry in entries {
            if entry.reps.is_some() == entry.duration_seconds.is_some() {
                return Err(PortError::Conflict(format!(
                    "entry '{}' violates the reps/duration check",
                    entry.exercise_name
                )));
            }
            if !seen.insert(entry.order_index) {
                return Err(PortError::Conflict(format!(
                    "duplicate order_index {}",
                    entry.order_index
                )));
            }
        }

        let mut prepared = Vec::with_capacity(entries.len());
        for entry in entries {
            self.last_entry_id += 1;
            prepared.push(WorkoutEntry {
                id: self.last_entry_id,
                ..entry.clone()
            });
        }
        prepared.sort_by_key(|e| e.order_index);
        Ok(prepared)
    }
}

/// Thread-safe in-memory store. Every operation holds a single lock for its
/// whole duration, so each call is atomic.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    /// Number of persisted workouts.
    pub fn workout_count(&self) -> usize {
        self.lock().map(|inner| inner.workouts.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let mut inner = self.lock()?;
        if inner.identity_taken(&user.username, &user.email, None) {
            return Err(PortError::Conflict(
                "username or email already exists".to_string(),
            ));
        }

        inner.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.last_user_id,
            username: user.username,
            email: user.email,
            password: user.password,
            bio: user.bio,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user_by_name(&self, username: &str) -> PortResult<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user: &User) -> PortResult<User> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&user.id) {
            return Err(PortError::NotFound(format!("User {} not found", user.id)));
        }
        if inner.identity_taken(&user.username, &user.email, Some(user.id)) {
            return Err(PortError::Conflict(
                "username or email already exists".to_string(),
            ));
        }

        let stored = inner
            .users
            .get_mut(&user.id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user.id)))?;
        stored.username = user.username.clone();
        stored.email = user.email.clone();
        stored.bio = user.bio.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn update_password(&self, user_id: i64, password: &Password) -> PortResult<()> {
        let mut inner = self.lock()?;
        let stored = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        stored.password = password.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn insert_token(&self, token: &Token) -> PortResult<()> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&token.user_id) {
            return Err(PortError::Conflict(format!(
                "token owner {} does not exist",
                token.user_id
            )));
        }
        inner.tokens.push(StoredToken {
            hash: token.hash.clone(),
            user_id: token.user_id,
            expiry: token.expiry,
            scope: token.scope.clone(),
        });
        Ok(())
    }

    async fn delete_all_tokens(&self, user_id: i64, scope: &str) -> PortResult<()> {
        let mut inner = self.lock()?;
        inner
            .tokens
            .retain(|t| !(t.user_id == user_id && t.scope == scope));
        Ok(())
    }

    async fn find_user_by_token(
        &self,
        scope: &str,
        digest: &[u8],
        now: DateTime<Utc>,
    ) -> PortResult<Option<User>> {
        let inner = self.lock()?;
        let owner = inner
            .tokens
            .iter()
            .find(|t| t.hash == digest && t.scope == scope && t.expiry > now)
            .map(|t| t.user_id);
        Ok(owner.and_then(|id| inner.users.get(&id).cloned()))
    }
}

#[async_trait]
impl WorkoutStore for InMemoryStore {
    async fn create_workout(&self, workout: &Workout) -> PortResult<Workout> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&workout.user_id) {
            return Err(PortError::Conflict(format!(
                "workout owner {} does not exist",
                workout.user_id
            )));
        }
        let entries = inner.prepare_entries(&workout.entries)?;

        inner.last_workout_id += 1;
        let created = Workout {
            id: inner.last_workout_id,
            entries,
            ..workout.clone()
        };
        inner.workouts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_workout_by_id(&self, id: i64) -> PortResult<Option<Workout>> {
        let inner = self.lock()?;
        Ok(inner.workouts.get(&id).cloned())
    }

    async fn update_workout(&self, workout: &Workout) -> PortResult<Workout> {
        let mut inner = self.lock()?;
        let owner = match inner.workouts.get(&workout.id) {
            Some(existing) => existing.user_id,
            None => return Err(PortError::NotFound(format!("Workout {} not found", workout.id))),
        };
        let entries = inner.prepare_entries(&workout.entries)?;

        let updated = Workout {
            user_id: owner,
            entries,
            ..workout.clone()
        };
        inner.workouts.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_workout(&self, id: i64) -> PortResult<()> {
        let mut inner = self.lock()?;
        inner
            .workouts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Workout {} not found", id)))
    }

    async fn get_workout_owner(&self, id: i64) -> PortResult<Option<i64>> {
        let inner = self.lock()?;
        Ok(inner.workouts.get(&id).map(|w| w.user_id))
    }
}

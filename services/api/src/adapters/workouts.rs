//! services/api/src/adapters/workouts.rs
//!
//! `WorkoutStore` for PostgreSQL. Header and entries are always written in one
//! transaction; a dropped, uncommitted transaction rolls back.

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection};
use workout_tracker_core::domain::{Workout, WorkoutEntry};
use workout_tracker_core::ports::{PortError, PortResult, WorkoutStore};

use super::db::{map_db_error, DbAdapter};

#[derive(FromRow)]
struct WorkoutRecord {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    duration: i32,
    calories_burned: i32,
}
impl WorkoutRecord {
    fn to_domain(self, entries: Vec<WorkoutEntry>) -> Workout {
        Workout {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration,
            calories_burned: self.calories_burned,
            entries,
        }
    }
}

#[derive(FromRow)]
struct EntryRecord {
    id: i64,
    exercise_name: String,
    sets: i32,
    reps: Option<i32>,
    duration_seconds: Option<i32>,
    weight: Option<f64>,
    notes: String,
    order_index: i32,
}
impl EntryRecord {
    fn to_domain(self) -> WorkoutEntry {
        WorkoutEntry {
            id: self.id,
            exercise_name: self.exercise_name,
            sets: self.sets,
            reps: self.reps,
            duration_seconds: self.duration_seconds,
            weight: self.weight,
            notes: self.notes,
            order_index: self.order_index,
        }
    }
}

/// Inserts `entries` in order-index order and returns them with their new ids.
async fn insert_entries(
    conn: &mut PgConnection,
    workout_id: i64,
    entries: &[WorkoutEntry],
) -> PortResult<Vec<WorkoutEntry>> {
    let mut ordered = entries.to_vec();
    ordered.sort_by_key(|e| e.order_index);

    for entry in ordered.iter_mut() {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO workout_entries \
             (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(workout_id)
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(entry.duration_seconds)
        .bind(entry.weight)
        .bind(&entry.notes)
        .bind(entry.order_index)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_db_error)?;
        entry.id = id;
    }
    Ok(ordered)
}

#[async_trait]
impl WorkoutStore for DbAdapter {
    async fn create_workout(&self, workout: &Workout) -> PortResult<Workout> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO workout (user_id, title, description, duration, calories_burned) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(workout.user_id)
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let entries = insert_entries(&mut tx, id, &workout.entries).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Workout {
            id,
            entries,
            ..workout.clone()
        })
    }

    async fn get_workout_by_id(&self, id: i64) -> PortResult<Option<Workout>> {
        let header = sqlx::query_as::<_, WorkoutRecord>(
            "SELECT id, user_id, title, description, duration, calories_burned \
             FROM workout WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(header) = header else {
            return Ok(None);
        };

        let entries = sqlx::query_as::<_, EntryRecord>(
            "SELECT id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index \
             FROM workout_entries WHERE workout_id = $1 ORDER BY order_index",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let entries = entries.into_iter().map(EntryRecord::to_domain).collect();
        Ok(Some(header.to_domain(entries)))
    }

    async fn update_workout(&self, workout: &Workout) -> PortResult<Workout> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owner: Option<(i64,)> = sqlx::query_as(
            "UPDATE workout SET title = $1, description = $2, duration = $3, calories_burned = $4, \
             updated_at = CURRENT_TIMESTAMP WHERE id = $5 RETURNING user_id",
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(workout.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some((user_id,)) = owner else {
            return Err(PortError::NotFound(format!("Workout {} not found", workout.id)));
        };

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(workout.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let entries = insert_entries(&mut tx, workout.id, &workout.entries).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(Workout {
            user_id,
            entries,
            ..workout.clone()
        })
    }

    async fn delete_workout(&self, id: i64) -> PortResult<()> {
        // Entries go with the header through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM workout WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Workout {} not found", id)));
        }
        Ok(())
    }

    async fn get_workout_owner(&self, id: i64) -> PortResult<Option<i64>> {
        let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM workout WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(owner.map(|(user_id,)| user_id))
    }
}

//! crates/workout_tracker_core/src/validation.rs
//!
//! Input checks run before anything reaches a store.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::{NewAccount, Workout, WorkoutEntry};

pub const MIN_PASSWORD_LENGTH: usize = 8;

// Upper bounds match the VARCHAR widths of the schema, counted in characters.
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_EXERCISE_NAME_LENGTH: usize = 255;

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
    })
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }
    if too_long(username, MAX_USERNAME_LENGTH) {
        return Err(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if too_long(email, MAX_EMAIL_LENGTH) {
        return Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LENGTH
        ));
    }
    if !email_regex().is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_new_account(account: &NewAccount) -> Result<(), String> {
    validate_username(&account.username)?;
    validate_password(&account.password)?;
    validate_email(&account.email)
}

fn validate_entry(entry: &WorkoutEntry) -> Result<(), String> {
    let name = &entry.exercise_name;
    if name.trim().is_empty() {
        return Err("Exercise name is required".to_string());
    }
    if too_long(name, MAX_EXERCISE_NAME_LENGTH) {
        return Err(format!(
            "Exercise name must be at most {} characters long",
            MAX_EXERCISE_NAME_LENGTH
        ));
    }
    if entry.sets <= 0 {
        return Err(format!("Exercise '{}' must have at least one set", name));
    }
    match (entry.reps, entry.duration_seconds) {
        (Some(_), Some(_)) | (None, None) => {
            return Err(format!(
                "Exercise '{}' must specify exactly one of reps or duration_seconds",
                name
            ))
        }
        (Some(reps), None) if reps <= 0 => {
            return Err(format!("Exercise '{}' must have positive reps", name))
        }
        (None, Some(secs)) if secs <= 0 => {
            return Err(format!("Exercise '{}' must have a positive duration", name))
        }
        _ => {}
    }
    if let Some(weight) = entry.weight {
        if !weight.is_finite() || weight < 0.0 {
            return Err(format!("Exercise '{}' has an invalid weight", name));
        }
    }
    Ok(())
}

pub fn validate_workout(workout: &Workout) -> Result<(), String> {
    if workout.title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    if too_long(&workout.title, MAX_TITLE_LENGTH) {
        return Err(format!(
            "Title must be at most {} characters long",
            MAX_TITLE_LENGTH
        ));
    }
    if workout.duration_minutes < 0 {
        return Err("Duration cannot be negative".to_string());
    }
    if workout.calories_burned < 0 {
        return Err("Calories burned cannot be negative".to_string());
    }

    let mut seen = HashSet::new();
    for entry in &workout.entries {
        validate_entry(entry)?;
        if !seen.insert(entry.order_index) {
            return Err(format!("Duplicate order_index {}", entry.order_index));
        }
    }
    Ok(())
}

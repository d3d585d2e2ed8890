//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use workout_tracker_core::ports::{TokenStore, UserStore, WorkoutStore};
use workout_tracker_core::{AccountService, TokenService, WorkoutService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub tokens: TokenService,
    pub workouts: WorkoutService,
}

impl AppState {
    /// Wires the services to whichever stores back them.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        workouts: Arc<dyn WorkoutStore>,
    ) -> Self {
        let tokens = TokenService::new(tokens);
        Self {
            accounts: AccountService::new(users, tokens.clone(), config.token_ttl),
            tokens,
            workouts: WorkoutService::new(workouts),
        }
    }
}

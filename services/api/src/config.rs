//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::Duration;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Lifetime of tokens issued at login.
    pub token_ttl: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let token_ttl = match std::env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => parse_ttl_hours(&raw)?,
            Err(_) => Duration::hours(24),
        };

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            token_ttl,
            cors_origin,
        })
    }

    /// A configuration suitable for tests that never touch the environment.
    pub fn test_default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "postgres://localhost/unused".to_string(),
            log_level: Level::DEBUG,
            token_ttl: Duration::hours(24),
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

fn parse_ttl_hours(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
        .and_then(Duration::try_hours)
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "TOKEN_TTL_HOURS".to_string(),
                format!(
                    "'{}' is not a number of hours between 1 and {}",
                    raw, MAX_TOKEN_TTL_HOURS
                ),
            )
        })
}

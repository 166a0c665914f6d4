//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::FixedOffset;
use std::net::SocketAddr;
use tracing::Level;

const DEFAULT_IDENTITY_LOOKUP_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which `AttendanceStore` implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub identity_api_key: String,
    pub identity_lookup_url: String,
    pub cors_allowed_origin: String,
    pub week_offset: FixedOffset,
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let invalid = |key: &str, reason: String| ConfigError::InvalidValue(key.to_string(), reason);

        // --- Load Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDRESS", e.to_string()))?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            invalid(
                "RUST_LOG",
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_allowed_origin =
            var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Load Storage Settings ---
        let storage_backend = match var("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => {
                return Err(invalid(
                    "STORAGE_BACKEND",
                    format!("'{}' is not one of postgres, memory", other),
                ))
            }
        };

        let database_url = var("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| invalid("DB_MAX_CONNECTIONS", e.to_string()))?,
            None => 5,
        };

        // --- Load Identity Provider Settings ---
        let identity_api_key = var("IDENTITY_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("IDENTITY_API_KEY".to_string()))?;
        let identity_lookup_url =
            var("IDENTITY_LOOKUP_URL").unwrap_or_else(|| DEFAULT_IDENTITY_LOOKUP_URL.to_string());

        // --- Load Week Settings ---
        let week_offset_minutes = match var("WEEK_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|e| invalid("WEEK_UTC_OFFSET_MINUTES", e.to_string()))?,
            None => 0,
        };
        let week_offset = week_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                invalid(
                    "WEEK_UTC_OFFSET_MINUTES",
                    format!("{} minutes is out of range", week_offset_minutes),
                )
            })?;

        Ok(Self {
            bind_address,
            storage_backend,
            database_url,
            db_max_connections,
            log_level,
            identity_api_key,
            identity_lookup_url,
            cors_allowed_origin,
            week_offset,
        })
    }
}

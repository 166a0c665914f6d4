//! services/api/src/error.rs
//!
//! Failures that abort startup. Request-time errors live in `web::error`.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting the Postgres pool failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The identity provider's HTTP client could not be built.
    #[error("HTTP Client Error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Binding the listener or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Startup failed: {0}")]
    Internal(String),
}

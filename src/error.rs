//! Error types for the concept review engine
//!
//! Selection itself never fails: empty histories, unmapped concepts and
//! exhausted backfill pools all produce (possibly short) results. Errors only
//! come from the surrounding store reads and configuration loading.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for concept review operations
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller passed an argument the engine cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for concept review operations
pub type Result<T> = std::result::Result<T, ReviewError>;

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        ReviewError::Other(err.to_string())
    }
}

impl From<rusqlite::Error> for ReviewError {
    fn from(err: rusqlite::Error) -> Self {
        ReviewError::Database(err.to_string())
    }
}

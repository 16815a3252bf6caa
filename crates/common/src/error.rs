//! Error types for meshconf

use thiserror::Error;

/// Result type alias using meshconf Error
pub type Result<T> = std::result::Result<T, Error>;

/// meshconf error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to signal process {pid}: {reason}")]
    Signal { pid: u32, reason: String },

    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Operation cancelled while waiting for the daemon to settle")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

//! Error types shared across the cleanline workspace

use thiserror::Error;

/// Result type alias for cleanline operations
pub type Result<T> = std::result::Result<T, CleanlineError>;

/// Top-level error type shared by the engine, server, and CLI crates
#[derive(Error, Debug)]
pub enum CleanlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

//! Error types for compdb-build.

use thiserror::Error;

/// Result type for compdb-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while loading or saving databases and config.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse or write JSON (compile_commands.json).
    #[error("Failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// Configuration validation error.
    #[error("Config validation error: {0}")]
    Validation(String),
}

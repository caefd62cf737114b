// Error types for pihelm

use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Pihelm-specific error types
#[derive(Error, Debug)]
pub enum PihelmError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

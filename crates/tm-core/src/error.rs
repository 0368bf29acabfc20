use thiserror::Error;

/// Top-level error type for the tm-core crate and dependents.
#[derive(Debug, Error)]
pub enum TmError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("similarity oracle error: {0}")]
    Oracle(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, TmError>;

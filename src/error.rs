use thiserror::Error;

/// Errors raised by the page model, the store and the command layer.
///
/// Navigation itself never fails: boundary hits and stale nodes degrade to a no-op.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid page snapshot: {0}")]
    SnapshotFailed(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid parameters for '{command}': {reason}")]
    InvalidParams { command: String, reason: String },

    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NavError>;

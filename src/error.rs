use thiserror::Error;

use crate::core::types::ManagerKind;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Package manager not available: {0}")]
    ManagerUnavailable(ManagerKind),

    #[error("Unknown package manager: {0}")]
    UnknownManager(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Failed to parse {manager} output: {message}")]
    ParseError { manager: ManagerKind, message: String },

    #[error("Preferences error: {0}")]
    ConfigError(String),

    /// Lock acquisition failed (e.g., mutex poisoned)
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;

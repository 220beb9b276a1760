//! Error types for the logger

use std::path::PathBuf;

/// Errors produced by the logger and its rotation subsystem
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A destination rejected the rendered bytes
    #[error("failed to write log event: {0}")]
    Write(#[from] std::io::Error),

    /// The log directory could not be listed
    #[error("failed to read log directory [ {} ] contents. Reason: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An old log entry could not be deleted
    #[error("failed to delete [ {} ]. Reason: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dated log file could not be opened
    #[error("failed to open log file [ {} ]. Reason: {source}", .path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("invalid rotation schedule: {0}")]
    InvalidSchedule(String),

    /// Rotation needs a tokio runtime to host its background task
    #[error("no tokio runtime available for the rotation task")]
    NoRuntime,

    #[error("logger lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, LogError>;

//! Error types for the portscope-core library.

use thiserror::Error;

/// Result type alias for portscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting snapshots and terminating processes.
#[derive(Error, Debug)]
pub enum Error {
    /// The process table itself could not be enumerated.
    #[error("Process collection failed: {0}")]
    CollectionFailed(String),

    /// The socket table could not be enumerated.
    #[error("Connection enumeration failed: {0}")]
    ConnectionEnumerationFailed(String),

    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// The process no longer exists.
    #[error("Process {0} not found")]
    ProcessNotFound(u32),

    /// The caller may not signal this process.
    #[error("Permission denied to kill process {0}")]
    PermissionDenied(u32),

    /// Failed to kill a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

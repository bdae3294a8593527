//! Error types for workflow operations.

use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or dispatching a workflow response.
#[derive(Debug, Error)]
pub enum Error {
    /// Could not resolve the storage directory.
    #[error("Could not find home directory for workflow storage")]
    NoHomeDir,

    /// Reading or writing the backing store failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to access the system keychain.
    #[cfg(feature = "secrets")]
    #[error("Failed to access system keychain: {0}")]
    Keychain(String),
}

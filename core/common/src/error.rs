//! Common error types for synclink.

use thiserror::Error;

/// Error type for storage adapters and remote file identities.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Remote file type outside the known set.
    #[error("Invalid remote file type: {0}")]
    InvalidType(String),

    /// Name does not match the structure required by its remote file type.
    #[error("Name '{name}' does not match the {kind} pattern")]
    PatternMismatch {
        /// Remote file type the name was checked against.
        kind: &'static str,
        /// Offending simple name.
        name: String,
    },
}

impl Error {
    /// Whether this error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

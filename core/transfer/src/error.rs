//! Error types for transfer operations.

use std::fmt;
use thiserror::Error;

use synclink_common::{Error, RemoteFileType};

/// Step of a copy-then-delete move that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePhase {
    /// Reading the source object. Nothing was written.
    Read,
    /// Writing the target object. The source is untouched.
    Write,
    /// Deleting the source after the target was written. Both copies may exist.
    DeleteSource,
}

impl fmt::Display for MovePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            MovePhase::Read => "read",
            MovePhase::Write => "write",
            MovePhase::DeleteSource => "delete-source",
        };
        f.write_str(phase)
    }
}

/// Failure of a transfer manager operation.
///
/// Every variant wraps the backend or local error that caused it.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Backend unreachable or misconfigured.
    #[error("Cannot connect to provider '{provider}': {source}")]
    Connection {
        /// Provider name from the settings.
        provider: String,
        /// Factory or adapter error.
        #[source]
        source: Error,
    },

    /// Remote read or local write of a download failed.
    #[error("Unable to download '{path}': {source}")]
    Download {
        /// Remote path being read.
        path: String,
        /// Backend or local filesystem error.
        #[source]
        source: Error,
    },

    /// Local read or remote write of an upload failed.
    #[error("Unable to upload to '{path}': {source}")]
    Upload {
        /// Remote path being written.
        path: String,
        /// Backend or local filesystem error.
        #[source]
        source: Error,
    },

    /// Backend refused a delete. A missing object is not a failure.
    #[error("Unable to delete '{path}': {source}")]
    Delete {
        /// Remote path being deleted.
        path: String,
        /// Backend error.
        #[source]
        source: Error,
    },

    /// Move failed; `phase` tells which step broke.
    #[error("Unable to move '{from}' to '{to}' ({phase} failed): {source}")]
    Move {
        /// Remote path of the source.
        from: String,
        /// Remote path of the target.
        to: String,
        /// Step that failed.
        phase: MovePhase,
        /// Backend error from that step.
        #[source]
        source: Error,
    },

    /// A channel could not be listed.
    #[error("Unable to list {kind} files: {source}")]
    List {
        /// Type being listed.
        kind: RemoteFileType,
        /// Backend error.
        #[source]
        source: Error,
    },
}

impl TransferError {
    /// Whether a move left both source and target on the backend.
    pub fn is_possible_duplicate(&self) -> bool {
        matches!(
            self,
            TransferError::Move {
                phase: MovePhase::DeleteSource,
                ..
            }
        )
    }
}

/// Result type alias for transfer operations.
pub type TransferResult<T> = std::result::Result<T, TransferError>;

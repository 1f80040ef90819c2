//! Common types shared across the synclink crates.
//!
//! This crate holds the error type used by storage adapters and the typed,
//! namespaced identities of objects stored on a remote backend.

pub mod error;
pub mod remote_file;

pub use error::{Error, Result};
pub use remote_file::{RemoteFile, RemoteFileType, REPO_FILE_NAME};

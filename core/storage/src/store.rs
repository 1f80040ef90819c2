//! Object store adapter trait definition.

use async_trait::async_trait;

use synclink_common::Result;

/// Primitive operations against a single backing store.
///
/// Paths are flat, fully qualified object names. Implementations translate
/// them to whatever the backend understands and must handle their own
/// authentication.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the adapter name (e.g., "memory", "local").
    fn name(&self) -> &str;

    /// Read the complete content of an object.
    ///
    /// # Errors
    /// - `Error::NotFound` if no object exists at `path`
    /// - Backend or I/O errors
    async fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Write an object, replacing any previous content.
    ///
    /// # Errors
    /// - Backend or I/O errors
    async fn put(&self, path: &str, data: Vec<u8>) -> Result<()>;

    /// Delete an object.
    ///
    /// Deleting a path that does not exist succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// List the raw names of all objects in the store.
    async fn list(&self) -> Result<Vec<String>>;

    /// Secondary channel for small metadata objects, if the backend has one.
    fn metadata_channel(&self) -> Option<&dyn ObjectStore> {
        None
    }

    /// Whether a completed write is visible to every following read.
    fn read_after_write_consistent(&self) -> bool {
        false
    }
}

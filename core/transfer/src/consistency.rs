//! Read-after-write consistency extension.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{TransferError, TransferResult};
use crate::routing::channel_for;
use synclink_common::RemoteFile;
use synclink_storage::ObjectStore;

/// Answers whether a just-written remote file is visible.
///
/// Callers that need read-after-write assurance ask the extension instead of
/// re-listing the backend themselves.
#[async_trait]
pub trait ReadAfterWriteConsistent: Send + Sync {
    /// Whether `file` is visible on the backend.
    async fn exists(&self, file: &RemoteFile) -> TransferResult<bool>;

    /// Whether `exists` answers without asking the backend.
    fn is_strong(&self) -> bool {
        false
    }
}

/// Extension for backends that are strongly consistent by construction.
///
/// `exists` reports `true` for every file, including files that were never
/// written. It must only be consulted for files the caller just wrote.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongConsistency;

#[async_trait]
impl ReadAfterWriteConsistent for StrongConsistency {
    async fn exists(&self, _file: &RemoteFile) -> TransferResult<bool> {
        Ok(true)
    }

    fn is_strong(&self) -> bool {
        true
    }
}

/// Extension for backends without the guarantee: checks the listing.
pub struct ListingConsistency {
    store: Arc<dyn ObjectStore>,
}

impl ListingConsistency {
    /// Create an extension bound to a connected session.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReadAfterWriteConsistent for ListingConsistency {
    async fn exists(&self, file: &RemoteFile) -> TransferResult<bool> {
        let remote_path = file.remote_path();
        let names = channel_for(self.store.as_ref(), file)
            .list()
            .await
            .map_err(|source| TransferError::List {
                kind: file.kind(),
                source,
            })?;
        Ok(names.iter().any(|name| *name == remote_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synclink_common::RemoteFileType;
    use synclink_storage::{MemoryStore, StoreOp};

    #[tokio::test]
    async fn test_strong_consistency_never_checks() {
        let file = RemoteFile::new(RemoteFileType::Database, "never-written").unwrap();
        assert!(StrongConsistency.exists(&file).await.unwrap());
        assert!(StrongConsistency.is_strong());
    }

    #[tokio::test]
    async fn test_listing_consistency_checks_backend() {
        let store = MemoryStore::new().with_eventual_consistency();
        let extension = ListingConsistency::new(Arc::new(store.clone()));
        let file = RemoteFile::new(RemoteFileType::Action, "up-1").unwrap();

        assert!(!extension.exists(&file).await.unwrap());
        store.put("ac-up-1", vec![1]).await.unwrap();
        assert!(extension.exists(&file).await.unwrap());
        assert!(!extension.is_strong());
    }

    #[tokio::test]
    async fn test_listing_consistency_reports_list_failure() {
        let store = MemoryStore::new();
        store.fail_on(StoreOp::List);
        let extension = ListingConsistency::new(Arc::new(store));
        let file = RemoteFile::new(RemoteFileType::Action, "up-1").unwrap();

        let result = extension.exists(&file).await;
        assert!(matches!(result, Err(TransferError::List { .. })));
    }
}

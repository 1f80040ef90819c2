//! Object store with separate data and metadata channels.

use async_trait::async_trait;
use std::sync::Arc;

use crate::store::ObjectStore;
use synclink_common::Result;

/// Combines a bulk data store with a metadata store.
///
/// The primitive operations of this adapter act on the data store. The
/// metadata store is reachable through [`ObjectStore::metadata_channel`].
pub struct DualChannelStore {
    data: Arc<dyn ObjectStore>,
    metadata: Arc<dyn ObjectStore>,
}

impl DualChannelStore {
    /// Create a dual channel store.
    pub fn new(data: Arc<dyn ObjectStore>, metadata: Arc<dyn ObjectStore>) -> Self {
        Self { data, metadata }
    }
}

#[async_trait]
impl ObjectStore for DualChannelStore {
    fn name(&self) -> &str {
        "dual"
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.data.get(path).await
    }

    async fn put(&self, path: &str, data: Vec<u8>) -> Result<()> {
        self.data.put(path, data).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.data.delete(path).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.data.list().await
    }

    fn metadata_channel(&self) -> Option<&dyn ObjectStore> {
        Some(self.metadata.as_ref())
    }

    fn read_after_write_consistent(&self) -> bool {
        self.data.read_after_write_consistent() && self.metadata.read_after_write_consistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_channels_are_separate() {
        let data = MemoryStore::new();
        let metadata = MemoryStore::new();
        let store = DualChannelStore::new(Arc::new(data.clone()), Arc::new(metadata.clone()));

        store.put("mc-1", vec![1]).await.unwrap();
        store
            .metadata_channel()
            .unwrap()
            .put("db-1", vec![2])
            .await
            .unwrap();

        assert!(data.contains("mc-1"));
        assert!(!data.contains("db-1"));
        assert!(metadata.contains("db-1"));
        assert_eq!(store.list().await.unwrap(), vec!["mc-1".to_string()]);
    }

    #[test]
    fn test_consistency_requires_both_channels() {
        let store = DualChannelStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new().with_eventual_consistency()),
        );
        assert!(!store.read_after_write_consistent());
    }
}

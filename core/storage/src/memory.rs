//! In-memory object store for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::store::ObjectStore;
use synclink_common::{Error, Result};

/// Primitive operation kinds, used for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Put,
    Delete,
    List,
}

#[derive(Debug, Default)]
struct Faults {
    offline: AtomicBool,
    failing: RwLock<HashSet<StoreOp>>,
}

/// In-memory object store.
///
/// Useful for testing and development. All data is stored in memory and
/// lost when the last clone is dropped. Clones share the same objects, so a
/// test can keep a handle while a transfer manager owns another.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    faults: Arc<Faults>,
    consistent: bool,
}

impl MemoryStore {
    /// Create a new empty, strongly consistent memory store.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            faults: Arc::new(Faults::default()),
            consistent: true,
        }
    }

    /// Declare this store as lacking read-after-write consistency.
    pub fn with_eventual_consistency(mut self) -> Self {
        self.consistent = false;
        self
    }

    /// Make every operation fail as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.faults.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every future call of `op` fail.
    pub fn fail_on(&self, op: StoreOp) {
        if let Ok(mut failing) = self.faults.failing.write() {
            failing.insert(op);
        }
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.faults.offline.store(false, Ordering::SeqCst);
        if let Ok(mut failing) = self.faults.failing.write() {
            failing.clear();
        }
    }

    /// Whether an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(path))
            .unwrap_or(false)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, op: StoreOp) -> Result<()> {
        if self.faults.offline.load(Ordering::SeqCst) {
            return Err(Error::Storage("Memory store is offline".to_string()));
        }
        let failing = self
            .faults
            .failing
            .read()
            .map_err(|_| Error::Storage("Fault registry lock poisoned".to_string()))?;
        if failing.contains(&op) {
            return Err(Error::Storage(format!("Injected failure on {:?}", op)));
        }
        Ok(())
    }

    fn poisoned() -> Error {
        Error::Storage("Memory store lock poisoned".to_string())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.check(StoreOp::Get)?;
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        objects
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", path)))
    }

    async fn put(&self, path: &str, data: Vec<u8>) -> Result<()> {
        self.check(StoreOp::Put)?;
        self.objects
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.check(StoreOp::Delete)?;
        self.objects
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(path);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.check(StoreOp::List)?;
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        Ok(objects.keys().cloned().collect())
    }

    fn read_after_write_consistent(&self) -> bool {
        self.consistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let store = MemoryStore::new();
        let data = b"Hello, World!".to_vec();

        store.put("mc-1", data.clone()).await.unwrap();
        assert_eq!(store.get("mc-1").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("mc-missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put("db-1", vec![1]).await.unwrap();

        store.delete("db-1").await.unwrap();
        store.delete("db-1").await.unwrap();
        assert!(!store.contains("db-1"));
    }

    #[tokio::test]
    async fn test_list() {
        let store = MemoryStore::new();
        store.put("db-1", vec![1]).await.unwrap();
        store.put("mc-2", vec![2]).await.unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names, vec!["db-1".to_string(), "mc-2".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.put("tx-1", vec![1]).await.unwrap();
        assert!(handle.contains("tx-1"));
        assert_eq!(handle.len(), 1);
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::new();
        store.fail_on(StoreOp::Put);
        assert!(store.put("mc-1", vec![1]).await.is_err());
        assert!(store.list().await.is_ok());

        store.set_offline(true);
        assert!(store.list().await.is_err());

        store.clear_failures();
        assert!(store.put("mc-1", vec![1]).await.is_ok());
    }
}

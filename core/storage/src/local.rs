//! Local filesystem object store.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::ObjectStore;
use synclink_common::{Error, Result};

/// Prefix of in-flight staging files; never reported by `list`.
const STAGING_PREFIX: &str = ".staging-";

/// Local filesystem object store.
///
/// Stores every object as a file directly under a root directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a new local store with the given root directory.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Permission denied
    /// - Root exists but is not a directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Store root is not a directory: {}",
                root.display()
            )));
        }

        debug!("Opened local store at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn to_fs_path(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty()
            || path.contains('/')
            || path.contains('\\')
            || path == "."
            || path == ".."
            || path.starts_with(STAGING_PREFIX)
        {
            return Err(Error::InvalidInput(format!("Invalid object path: {:?}", path)));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let fs_path = self.to_fs_path(path)?;

        match fs::read(&fs_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Object not found: {}", path)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn put(&self, path: &str, data: Vec<u8>) -> Result<()> {
        let fs_path = self.to_fs_path(path)?;
        let staging = self
            .root
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));

        fs::write(&staging, &data).await?;
        if let Err(e) = fs::rename(&staging, &fs_path).await {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                warn!("Leaving staging file {}: {}", staging.display(), cleanup);
            }
            return Err(Error::Io(e));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let fs_path = self.to_fs_path(path)?;

        match fs::remove_file(&fs_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut results = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name.starts_with(STAGING_PREFIX) {
                continue;
            }
            results.push(name);
        }

        results.sort();
        Ok(results)
    }

    fn read_after_write_consistent(&self) -> bool {
        true
    }
}

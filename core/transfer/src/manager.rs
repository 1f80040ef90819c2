//! Transfer manager contract and its object store implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::consistency::{ListingConsistency, ReadAfterWriteConsistent, StrongConsistency};
use crate::error::{MovePhase, TransferError, TransferResult};
use crate::routing::{channel_for, channels_for_kind};
use crate::settings::TransferSettings;
use synclink_common::{Error, RemoteFile, RemoteFileType, Result};
use synclink_storage::{ObjectStore, ProviderRegistry, StoreFactory};

/// Reserved object written by [`TransferManager::test_target_can_write`].
///
/// Contains no `-`, so it never parses as a namespaced remote file.
pub const WRITE_PROBE_PATH: &str = "syncany-test-write";

const WRITE_PROBE_DATA: [u8; 3] = [0x01, 0x02, 0x03];

/// Uniform contract between a sync engine and a remote storage backend.
///
/// Every public operation connects lazily. Backend failures are reported as
/// [`TransferError`]; probes reduce all failures to `false`.
///
/// Operations on one manager are not synchronized with each other. Callers
/// sharing a manager across tasks serialize access themselves.
#[async_trait]
pub trait TransferManager: Send + Sync {
    /// Open the backend session. No-op if already connected.
    async fn connect(&self) -> TransferResult<()>;

    /// Release the backend session. No-op if not connected.
    async fn disconnect(&mut self) -> TransferResult<()>;

    /// Prepare the target for use.
    async fn init(&self, create_if_required: bool) -> TransferResult<()>;

    /// Download a remote file, replacing `local_path`.
    ///
    /// # Postconditions
    /// - On success `local_path` holds exactly the remote content
    /// - On failure no staging file remains and `local_path` is untouched
    async fn download(&self, file: &RemoteFile, local_path: &Path) -> TransferResult<()>;

    /// Upload a local file.
    async fn upload(&self, local_path: &Path, file: &RemoteFile) -> TransferResult<()>;

    /// Delete a remote file. A file that is already absent counts as deleted.
    async fn delete(&self, file: &RemoteFile) -> TransferResult<bool>;

    /// Move a remote file as read, write target, delete source.
    ///
    /// The three steps are not atomic. If deleting the source fails after the
    /// target was written, both copies exist and the error reports
    /// [`MovePhase::DeleteSource`].
    async fn move_file(&self, source: &RemoteFile, target: &RemoteFile) -> TransferResult<()>;

    /// List remote files of one type, keyed by simple name.
    async fn list(&self, kind: RemoteFileType) -> TransferResult<HashMap<String, RemoteFile>>;

    /// Whether a probe object can be written to the target.
    async fn test_target_can_write(&self) -> bool;

    /// Whether the target can be listed.
    async fn test_target_exists(&self) -> bool;

    /// Whether the target can be created.
    async fn test_target_can_create(&self) -> bool;

    /// Whether the repository marker exists on the target.
    async fn test_repo_file_exists(&self) -> bool;

    /// Read-after-write extension matching the backend's guarantees.
    async fn read_after_write(&self) -> TransferResult<Box<dyn ReadAfterWriteConsistent>>;
}

/// Transfer manager driving an [`ObjectStore`] adapter.
///
/// The session is opened on first use through the provider's store factory
/// and kept until [`TransferManager::disconnect`].
pub struct StoreTransferManager {
    provider: String,
    config: serde_json::Value,
    factory: StoreFactory,
    session: OnceCell<Arc<dyn ObjectStore>>,
}

impl StoreTransferManager {
    /// Create a manager for the provider named in `settings`.
    ///
    /// Does not connect.
    ///
    /// # Errors
    /// - `TransferError::Connection` if the provider is not registered
    pub fn new(settings: TransferSettings, registry: &ProviderRegistry) -> TransferResult<Self> {
        let factory =
            registry
                .factory(&settings.provider)
                .ok_or_else(|| TransferError::Connection {
                    provider: settings.provider.clone(),
                    source: Error::NotFound(format!(
                        "Provider '{}' is not registered",
                        settings.provider
                    )),
                })?;

        Ok(Self::from_factory(settings.provider, settings.config, factory))
    }

    /// Create a manager from an explicit store factory.
    pub fn from_factory(
        provider: impl Into<String>,
        config: serde_json::Value,
        factory: StoreFactory,
    ) -> Self {
        Self {
            provider: provider.into(),
            config,
            factory,
            session: OnceCell::new(),
        }
    }

    /// Provider name this manager connects to.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Current session handle, if connected.
    pub fn session(&self) -> Option<Arc<dyn ObjectStore>> {
        self.session.get().cloned()
    }

    /// Whether a session is open.
    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }

    async fn connected(&self) -> TransferResult<Arc<dyn ObjectStore>> {
        let store = self
            .session
            .get_or_try_init(|| async {
                let store = (self.factory)(&self.config).map_err(|source| {
                    TransferError::Connection {
                        provider: self.provider.clone(),
                        source,
                    }
                })?;
                info!("Connected to provider '{}' ({})", self.provider, store.name());
                Ok::<_, TransferError>(store)
            })
            .await?;
        Ok(Arc::clone(store))
    }
}

#[async_trait]
impl TransferManager for StoreTransferManager {
    async fn connect(&self) -> TransferResult<()> {
        self.connected().await.map(|_| ())
    }

    async fn disconnect(&mut self) -> TransferResult<()> {
        if self.session.take().is_some() {
            info!("Disconnected from provider '{}'", self.provider);
        }
        Ok(())
    }

    async fn init(&self, _create_if_required: bool) -> TransferResult<()> {
        self.connect().await
    }

    async fn download(&self, file: &RemoteFile, local_path: &Path) -> TransferResult<()> {
        let store = self.connected().await?;
        let remote_path = file.remote_path();
        let failed = |source| TransferError::Download {
            path: remote_path.clone(),
            source,
        };

        let data = channel_for(store.as_ref(), file)
            .get(&remote_path)
            .await
            .map_err(failed)?;
        debug!("Downloaded {} ({} bytes)", remote_path, data.len());

        stage_and_replace(local_path, &data).await.map_err(failed)
    }

    async fn upload(&self, local_path: &Path, file: &RemoteFile) -> TransferResult<()> {
        let store = self.connected().await?;
        let remote_path = file.remote_path();

        let result: Result<()> = async {
            let data = fs::read(local_path).await?;
            channel_for(store.as_ref(), file)
                .put(&remote_path, data)
                .await
        }
        .await;

        match result {
            Ok(()) => {
                debug!("Uploaded {} to {}", local_path.display(), remote_path);
                Ok(())
            }
            Err(source) => {
                error!(
                    "Cannot upload {} to {}: {}",
                    local_path.display(),
                    remote_path,
                    source
                );
                Err(TransferError::Upload {
                    path: remote_path,
                    source,
                })
            }
        }
    }

    async fn delete(&self, file: &RemoteFile) -> TransferResult<bool> {
        let store = self.connected().await?;
        let remote_path = file.remote_path();

        match channel_for(store.as_ref(), file).delete(&remote_path).await {
            Ok(()) => {
                debug!("Removed {}", remote_path);
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                debug!("Already absent: {}", remote_path);
                Ok(true)
            }
            Err(source) => {
                error!("Unable to delete remote file {}: {}", remote_path, source);
                Err(TransferError::Delete {
                    path: remote_path,
                    source,
                })
            }
        }
    }

    async fn move_file(&self, source: &RemoteFile, target: &RemoteFile) -> TransferResult<()> {
        let store = self.connected().await?;
        let from = source.remote_path();
        let to = target.remote_path();
        let failed = |phase, source| TransferError::Move {
            from: from.clone(),
            to: to.clone(),
            phase,
            source,
        };

        let data = channel_for(store.as_ref(), source)
            .get(&from)
            .await
            .map_err(|e| {
                error!("Cannot move {} to {}: read failed: {}", from, to, e);
                failed(MovePhase::Read, e)
            })?;

        // Writing then deleting the same object would lose it.
        if from == to && source.is_bulk_data() == target.is_bulk_data() {
            debug!("Move of {} onto itself, nothing to do", from);
            return Ok(());
        }

        channel_for(store.as_ref(), target)
            .put(&to, data)
            .await
            .map_err(|e| {
                error!("Cannot move {} to {}: write failed: {}", from, to, e);
                failed(MovePhase::Write, e)
            })?;

        if let Err(e) = channel_for(store.as_ref(), source).delete(&from).await {
            error!(
                "Moved {} to {} but could not delete the source, possibly duplicated: {}",
                from, to, e
            );
            return Err(failed(MovePhase::DeleteSource, e));
        }

        debug!("Moved {} -> {}", from, to);
        Ok(())
    }

    async fn list(&self, kind: RemoteFileType) -> TransferResult<HashMap<String, RemoteFile>> {
        let store = self.connected().await?;
        let names = match list_names(store.as_ref(), kind).await {
            Ok(names) => names,
            Err(source) => {
                error!("Unable to list {} files: {}", kind, source);
                return Err(TransferError::List { kind, source });
            }
        };

        let mut files = HashMap::new();
        for raw in names.iter().filter(|raw| raw.starts_with(kind.prefix())) {
            match RemoteFile::from_listed_name(raw, kind) {
                Ok(Some(file)) => {
                    files.insert(file.name().to_string(), file);
                }
                Ok(None) => debug!("Skipping malformed {} object {}", kind, raw),
                Err(e) => warn!("Ignoring {} object {}: {}", kind, raw, e),
            }
        }

        Ok(files)
    }

    async fn test_target_can_write(&self) -> bool {
        let result = match self.connected().await {
            Ok(store) => store
                .put(WRITE_PROBE_PATH, WRITE_PROBE_DATA.to_vec())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                info!("testTargetCanWrite: success, target has write access");
                true
            }
            Err(e) => {
                info!("testTargetCanWrite: could not write: {}", e);
                false
            }
        }
    }

    async fn test_target_exists(&self) -> bool {
        let result = match self.connected().await {
            Ok(store) => store.list().await.map(|_| ()).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(e) = &result {
            info!("testTargetExists: target exist test failed: {}", e);
        }
        result.is_ok()
    }

    async fn test_target_can_create(&self) -> bool {
        self.test_target_can_write().await
    }

    async fn test_repo_file_exists(&self) -> bool {
        let repo = RemoteFile::repo();
        let repo_path = repo.remote_path();

        let result = match self.connected().await {
            Ok(store) => channel_for(store.as_ref(), &repo)
                .list()
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(names) => names.contains(&repo_path),
            Err(e) => {
                info!("testRepoFileExists: cannot retrieve repo file list: {}", e);
                false
            }
        }
    }

    async fn read_after_write(&self) -> TransferResult<Box<dyn ReadAfterWriteConsistent>> {
        let store = self.connected().await?;
        if store.read_after_write_consistent() {
            Ok(Box::new(StrongConsistency))
        } else {
            Ok(Box::new(ListingConsistency::new(store)))
        }
    }
}

/// Raw names of every object on the channels holding `kind`.
async fn list_names(store: &dyn ObjectStore, kind: RemoteFileType) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for channel in channels_for_kind(store, kind) {
        names.extend(channel.list().await?);
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Write `data` next to `destination`, then rename it over `destination`.
///
/// The staging file is removed on every failure path.
async fn stage_and_replace(destination: &Path, data: &[u8]) -> Result<()> {
    let file_name = destination.file_name().ok_or_else(|| {
        Error::InvalidInput(format!(
            "Download destination has no file name: {}",
            destination.display()
        ))
    })?;
    let parent = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let staging = parent.join(format!(
        ".{}.{}.part",
        file_name.to_string_lossy(),
        Uuid::new_v4()
    ));

    let result: Result<()> = async {
        fs::write(&staging, data).await?;
        replace_file(&staging, destination).await?;
        Ok(())
    }
    .await;

    if result.is_err() {
        if let Err(e) = fs::remove_file(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove staging file {}: {}", staging.display(), e);
            }
        }
    }
    result
}

async fn replace_file(staging: &Path, destination: &Path) -> std::io::Result<()> {
    match fs::rename(staging, destination).await {
        Ok(()) => Ok(()),
        // Platforms where rename does not replace an existing file.
        Err(_) if fs::try_exists(destination).await.unwrap_or(false) => {
            fs::remove_file(destination).await?;
            fs::rename(staging, destination).await
        }
        Err(e) => Err(e),
    }
}

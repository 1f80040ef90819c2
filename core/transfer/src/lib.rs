//! Transfer layer between a file synchronization engine and remote storage.
//!
//! This module provides:
//! - A uniform `TransferManager` contract for upload, download, delete, move and list
//! - A manager driving any `ObjectStore` adapter, with lazy session setup
//! - Typed transfer errors that never leak backend specifics
//! - Pre-flight capability probes reduced to booleans
//! - A read-after-write consistency extension

pub mod consistency;
pub mod error;
pub mod manager;
pub mod routing;
pub mod settings;

pub use consistency::{ListingConsistency, ReadAfterWriteConsistent, StrongConsistency};
pub use error::{MovePhase, TransferError, TransferResult};
pub use manager::{StoreTransferManager, TransferManager, WRITE_PROBE_PATH};
pub use settings::TransferSettings;

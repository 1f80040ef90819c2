//! Object store adapters for synclink.
//!
//! This crate defines the primitive get/put/delete/list contract a transfer
//! manager relies on, a few concrete backends, and a provider registry that
//! builds a backend session from a provider name and its configuration.
//!
//! # Design Principles
//! - Flat namespace: adapters store opaque objects under raw string paths
//! - Idempotent deletes: removing an absent object is not an error
//! - Optional metadata channel: small control objects can live apart from bulk data

pub mod dual;
pub mod local;
pub mod memory;
pub mod registry;
pub mod store;

pub use dual::DualChannelStore;
pub use local::LocalStore;
pub use memory::{MemoryStore, StoreOp};
pub use registry::{create_default_registry, ProviderRegistry, StoreFactory};
pub use store::ObjectStore;

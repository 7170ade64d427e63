//! Runtime configuration store.
//!
//! This crate provides:
//! - A thread-safe [`ConfigStore`] holding the tracking configuration
//! - Lenient validation of partial JSON updates
//! - Durable persistence (atomic JSON file) behind [`ConfigPersistence`]

pub mod error;
pub mod persistence;
pub mod store;
pub mod validation;

pub use error::{StoreError, StoreResult};
pub use persistence::{ConfigPersistence, JsonFilePersistence, MemoryPersistence};
pub use store::ConfigStore;
pub use validation::parse_update;

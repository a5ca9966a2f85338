//! Record Storage
//!
//! The registry persists wells, the append-only submission history and the
//! code tables through the [`RecordStore`] trait. Two backends ship:
//! an in-memory store and a sled database.

pub mod lockfile;
pub mod persistence;
pub mod sled_store;

pub use lockfile::{LockError, ProcessLock};
pub use persistence::{InMemoryStore, RecordStore, StoreError};
pub use sled_store::SledStore;

use serde::{Deserialize, Serialize};

/// Which record store backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sled => write!(f, "sled"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

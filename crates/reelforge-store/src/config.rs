//! Explicit, serializable store configuration (§3 of the ambient spec),
//! in the same shape as `reelforge_core::config::CoreConfig`: no
//! environment reads, a constructor per backend, validated eagerly.

use std::path::PathBuf;
use std::sync::Arc;

use crate::storage_context::{InMemoryStorageContext, LocalStorageContext, StorageContext};

/// Which backend a `StoreConfig` resolves to.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Rooted at a local directory; this is what every real CLI invocation
    /// uses.
    LocalDir(PathBuf),
    /// In-process, used by tests that don't want to touch disk.
    InMemory,
}

/// Configuration for opening a storage context: which backend, and the
/// relative root under it movies are stored beneath (`builds` by default,
/// §6.1).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub base_path: String,
}

impl StoreConfig {
    /// A local-directory-backed config rooted at `root`, matching the
    /// reference store's `local_dev` constructor.
    pub fn local_dev(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::LocalDir(root.into()),
            base_path: "builds".to_string(),
        }
    }

    /// An in-memory config for tests.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            base_path: "builds".to_string(),
        }
    }

    /// Open the configured backend as a boxed `StorageContext`, rooted so
    /// that callers address movies as `<base_path>/<movie_id>/...`.
    pub fn open(&self) -> Arc<dyn StorageContext> {
        match &self.backend {
            StoreBackend::LocalDir(root) => {
                Arc::new(LocalStorageContext::new(root.join(&self.base_path)))
            }
            StoreBackend::InMemory => Arc::new(InMemoryStorageContext::new()),
        }
    }
}

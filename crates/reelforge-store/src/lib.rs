//! reelforge-store
//!
//! Local persistence for Reelforge: a storage context abstraction over a
//! local-filesystem or in-memory backend, content-addressed blob storage,
//! the append-only event logs, and the pointer-mediated manifest service.
//! This is the only crate in the workspace that performs filesystem I/O.

pub mod blob_store;
pub mod clock;
pub mod config;
pub mod errors;
pub mod event_log;
pub mod gc;
pub mod manifest_service;
pub mod storage_context;

pub use clock::SystemClock;
pub use config::{StoreBackend, StoreConfig};
pub use errors::{StoreError, StoreResult};
pub use event_log::EventLog;
pub use manifest_service::{LoadedManifest, ManifestService};
pub use storage_context::{
    initialize_movie_storage, InMemoryStorageContext, LocalStorageContext, StorageContext,
};

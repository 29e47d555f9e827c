//! Error taxonomy for storage, event log, and manifest operations.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] reelforge_core::CoreError),

    #[error("pointer missing or unreadable for movie '{0}'")]
    ManifestNotFound(String),

    #[error("manifest conflict: expected previous hash {expected:?}, found {found:?}")]
    ManifestConflict {
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("invalid path segment: {0}")]
    InvalidPath(String),

    #[error("blob not found: {0}")]
    BlobNotFound(String),
}

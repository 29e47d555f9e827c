//! Error taxonomy for reelforge-core.
//!
//! Each variant corresponds to one of the error kinds named by the error
//! handling design: `BlueprintParseError`, `BlueprintGraphError`, and
//! `CycleError` all originate here. Storage- and manifest-level errors live
//! in `reelforge-store` since only that crate performs I/O.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("blueprint parse error: {0}")]
    BlueprintParseError(String),

    #[error("blueprint graph error: {0}")]
    BlueprintGraphError(String),

    #[error("cycle detected in dirty subgraph: {participants:?}")]
    CycleError { participants: Vec<String> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::BlueprintParseError(msg.into())
    }

    pub fn graph(msg: impl Into<String>) -> Self {
        Self::BlueprintGraphError(msg.into())
    }

    pub fn cycle(participants: Vec<String>) -> Self {
        Self::CycleError { participants }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

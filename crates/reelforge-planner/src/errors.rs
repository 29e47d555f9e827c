use thiserror::Error;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Core(#[from] reelforge_core::CoreError),

    #[error(transparent)]
    Store(#[from] reelforge_store::StoreError),

    #[error("blueprint parse error: {0}")]
    BlueprintParse(String),

    #[error("sub-blueprint source cycle: {0}")]
    SourceCycle(String),

    #[error("no source registered for '{0}'")]
    SourceNotFound(String),

    #[error("non-canonical input id: {0}")]
    NonCanonicalInput(String),
}

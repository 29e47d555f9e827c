use thiserror::Error;

pub type RunnerResult<T> = Result<T, RunError>;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] reelforge_core::CoreError),

    #[error(transparent)]
    Store(#[from] reelforge_store::StoreError),

    #[error(transparent)]
    Producers(#[from] reelforge_producers::ProducersError),
}

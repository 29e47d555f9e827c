use thiserror::Error;

pub type ProducersResult<T> = Result<T, ProducersError>;

#[derive(Debug, Error)]
pub enum ProducersError {
    #[error("no producer registered for '{0}'")]
    NotFound(String),

    #[error("producer '{0}' already registered")]
    AlreadyRegistered(String),
}

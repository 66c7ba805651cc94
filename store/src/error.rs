use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

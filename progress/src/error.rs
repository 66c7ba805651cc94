use thiserror::Error;
use vouch_types::{CredentialStatus, VouchError};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("credential not tracked: {0}")]
    NotFound(String),

    #[error("credential is closed ({0}); no further actions accepted")]
    Closed(CredentialStatus),
}

impl From<ProgressError> for VouchError {
    fn from(e: ProgressError) -> Self {
        match e {
            ProgressError::NotFound(id) => VouchError::NotFound(id),
            ProgressError::Closed(CredentialStatus::Expired) => VouchError::Expired,
            ProgressError::Closed(status) => VouchError::Closed(status.to_string()),
        }
    }
}

use thiserror::Error;
use vouch_types::{ErrorCode, VouchError};

/// Why issuance was refused.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid option: {0}")]
    InvalidOption(&'static str),
}

impl From<IssueError> for VouchError {
    fn from(e: IssueError) -> Self {
        VouchError::Validation(e.to_string())
    }
}

/// Why a scanned payload failed validation. Ordered checks: parse, then
/// signature, then expiry, then (online mode only) authoritative status.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("signature mismatch, credential was altered after issuance")]
    SignatureMismatch,

    #[error("credential has expired")]
    Expired,

    #[error("credential has been invalidated")]
    Invalidated,

    #[error("credential is closed ({0})")]
    Closed(vouch_types::CredentialStatus),
}

impl ValidationFailure {
    /// The stable error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::Validation,
            Self::SignatureMismatch => ErrorCode::Signature,
            Self::Expired => ErrorCode::Expired,
            Self::Invalidated | Self::Closed(_) => ErrorCode::Closed,
        }
    }
}

impl From<ValidationFailure> for VouchError {
    fn from(e: ValidationFailure) -> Self {
        match e {
            ValidationFailure::Malformed(m) => VouchError::Validation(m),
            ValidationFailure::SignatureMismatch => VouchError::Signature,
            ValidationFailure::Expired => VouchError::Expired,
            ValidationFailure::Invalidated => VouchError::Closed("invalidated".into()),
            ValidationFailure::Closed(s) => VouchError::Closed(s.to_string()),
        }
    }
}

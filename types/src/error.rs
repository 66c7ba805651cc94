//! Shared error taxonomy exposed to collaborators.
//!
//! Component crates keep their own narrow `thiserror` enums; this type is
//! the surface the outer request layer sees, with a stable string code per
//! category.

use thiserror::Error;

/// Stable error codes returned alongside failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Auth,
    Signature,
    Expired,
    Closed,
    NotFound,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Auth => "AUTH_ERROR",
            Self::Signature => "SIGNATURE_ERROR",
            Self::Expired => "EXPIRED_ERROR",
            Self::Closed => "CLOSED_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Common error type for the vouch service.
#[derive(Debug, Error)]
pub enum VouchError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("signature mismatch, credential was altered after issuance")]
    Signature,

    #[error("credential has expired")]
    Expired,

    #[error("credential is closed: {0}")]
    Closed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl VouchError {
    /// The stable code for this error category.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Auth(_) => ErrorCode::Auth,
            Self::Signature => ErrorCode::Signature,
            Self::Expired => ErrorCode::Expired,
            Self::Closed(_) => ErrorCode::Closed,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

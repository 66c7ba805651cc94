//! Credential issuance and verification.
//!
//! An issued credential is a self-contained, signed, time-limited record of
//! a guarantor request. Issuance computes an HMAC over a canonical field
//! subset; verification recomputes it offline from the scanned payload, so
//! any post-issuance alteration of a canonical field is detected without a
//! storage lookup. The render of the payload into a scannable image is an
//! external concern; this crate's boundary is the JSON payload.

pub mod canonical;
pub mod error;
pub mod issuer;
pub mod payload;
pub mod verifier;

pub use error::{IssueError, ValidationFailure};
pub use issuer::{IssueOptions, Issuer};
pub use payload::CredentialPayload;
pub use verifier::{LoanView, StatusProvider, Verifier};

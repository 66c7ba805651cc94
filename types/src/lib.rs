//! Fundamental types for the vouch guarantor-credential service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, timestamps, loan/applicant/guarantor records, the
//! credential itself, progress snapshots, and the shared error taxonomy.

pub mod credential;
pub mod error;
pub mod id;
pub mod loan;
pub mod party;
pub mod progress;
pub mod time;

pub use credential::{ActionKind, Credential, CredentialStatus, GuarantorAction};
pub use error::{ErrorCode, VouchError};
pub use id::{CredentialId, DeviceId, LoanId};
pub use loan::LoanTerms;
pub use party::{Applicant, Guarantor};
pub use progress::ProgressSnapshot;
pub use time::Timestamp;

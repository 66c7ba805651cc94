//! The credential record and its lifecycle enums.

use crate::id::{CredentialId, DeviceId, LoanId};
use crate::loan::LoanTerms;
use crate::party::{Applicant, Guarantor};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a credential.
///
/// Transitions are monotonic: only `Active -> Completed`,
/// `Active -> Expired`, and `Active -> Invalidated` are legal. Once a
/// credential is non-active no further action mutates its counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    /// Accepting guarantor actions.
    Active,
    /// Required number of guarantors approved.
    Completed,
    /// Past its expiry deadline (applied lazily at read or validation time).
    Expired,
    /// Explicitly invalidated by the applicant.
    Invalidated,
}

impl CredentialStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Invalidated => "invalidated",
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a guarantor did with a scanned credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Opened the loan terms without responding.
    Viewed,
    /// Agreed to guarantee the loan.
    Approved,
    /// Refused to guarantee the loan.
    Declined,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewed => "viewed",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded guarantor response on a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorAction {
    pub guarantor: Guarantor,
    pub action: ActionKind,
    pub timestamp: Timestamp,
    pub device_id: DeviceId,
}

/// A signed, time-limited guarantor request for a specific loan.
///
/// The signature covers the canonical field subset fixed at issuance
/// (id, loan id, applicant, terms, issued/expiry times) and is never
/// recomputed over post-issuance mutations; counters and action history
/// live outside the signed region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: CredentialId,
    pub loan_id: LoanId,
    pub applicant: Applicant,
    pub loan: LoanTerms,
    /// Hex-encoded HMAC over the canonical field subset.
    pub signature: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: CredentialStatus,
    pub scan_count: u32,
    pub guarantors_found: u32,
    pub guarantors_required: u32,
    /// Ordered action history, appended only through the progress tracker.
    pub actions: Vec<GuarantorAction>,
}

impl Credential {
    /// Whether the expiry deadline has passed, irrespective of `status`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_past(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(!CredentialStatus::Active.is_terminal());
        assert!(CredentialStatus::Completed.is_terminal());
        assert!(CredentialStatus::Expired.is_terminal());
        assert!(CredentialStatus::Invalidated.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&CredentialStatus::Invalidated).unwrap();
        assert_eq!(json, "\"invalidated\"");
        let json = serde_json::to_string(&ActionKind::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
    }
}

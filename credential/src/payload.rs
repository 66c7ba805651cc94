//! The scannable payload: what the external QR encoder renders.
//!
//! This is the self-contained form handed to a guarantor's device: the
//! canonical fields plus the signature, nothing else. Encoding to and from
//! JSON is the boundary of the opaque visual transform.

use serde::{Deserialize, Serialize};
use vouch_types::{Applicant, Credential, CredentialId, LoanId, LoanTerms, Timestamp};

/// Self-contained scannable representation of a credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    pub id: CredentialId,
    pub loan_id: LoanId,
    pub applicant: Applicant,
    pub loan: LoanTerms,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    /// Hex-encoded HMAC over the canonical fields above.
    pub signature: String,
}

impl CredentialPayload {
    /// Extract the payload from an issued credential.
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            loan_id: credential.loan_id.clone(),
            applicant: credential.applicant.clone(),
            loan: credential.loan.clone(),
            issued_at: credential.issued_at,
            expires_at: credential.expires_at,
            signature: credential.signature.clone(),
        }
    }

    /// Serialize to the JSON string the QR encoder consumes.
    pub fn to_json(&self) -> String {
        // A struct of strings and integers cannot fail JSON serialization.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a scanned JSON payload.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

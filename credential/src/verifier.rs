//! Credential verification.
//!
//! Verification is offline-safe by construction: signature and expiry are
//! checked from the payload alone. When built with a [`StatusProvider`]
//! (online/strict mode) the authoritative status is consulted as well, so
//! an explicitly invalidated credential is refused even though its
//! signature still verifies. Without one there is a documented consistency
//! gap: an invalidated credential validates until its expiry.

use crate::canonical::canonical_bytes;
use crate::error::ValidationFailure;
use crate::payload::CredentialPayload;
use serde::Serialize;
use tracing::debug;
use vouch_crypto::{verify_hmac_sha256, SigningKey};
use vouch_types::{Applicant, CredentialId, CredentialStatus, LoanId, LoanTerms, Timestamp};

/// Source of authoritative credential status for strict validation.
pub trait StatusProvider: Send + Sync {
    /// Current status of the credential, or `None` if unknown to this node.
    fn status(&self, id: &CredentialId) -> Option<CredentialStatus>;
}

/// Sanitized view returned to a guarantor's device on success: display
/// fields only, never signature or key material.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub credential_id: CredentialId,
    pub loan_id: LoanId,
    pub applicant: Applicant,
    pub loan: LoanTerms,
    pub expires_at: Timestamp,
}

/// Cryptographically and temporally validates scanned credentials.
pub struct Verifier {
    key: SigningKey,
    status_provider: Option<Box<dyn StatusProvider>>,
}

impl Verifier {
    /// Offline verifier: signature + expiry only.
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            status_provider: None,
        }
    }

    /// Strict verifier that additionally rejects credentials whose
    /// authoritative status is no longer active.
    pub fn with_status_provider(key: SigningKey, provider: Box<dyn StatusProvider>) -> Self {
        Self {
            key,
            status_provider: Some(provider),
        }
    }

    /// Validate a raw scanned payload.
    ///
    /// Checks run in a fixed order so the caller always learns the most
    /// fundamental failure first: parse, signature, expiry, status.
    pub fn validate(&self, raw_payload: &str, now: Timestamp) -> Result<LoanView, ValidationFailure> {
        let payload = CredentialPayload::from_json(raw_payload)
            .map_err(|e| ValidationFailure::Malformed(e.to_string()))?;
        self.validate_payload(&payload, now)
    }

    /// Validate an already-parsed payload.
    pub fn validate_payload(
        &self,
        payload: &CredentialPayload,
        now: Timestamp,
    ) -> Result<LoanView, ValidationFailure> {
        let signature = hex::decode(&payload.signature)
            .map_err(|_| ValidationFailure::Malformed("signature is not hex".into()))?;

        let bytes = canonical_bytes(
            &payload.id,
            &payload.loan_id,
            &payload.applicant,
            &payload.loan,
            payload.issued_at,
            payload.expires_at,
        );
        // Constant-time comparison; a near-miss tag leaks nothing.
        if !verify_hmac_sha256(&self.key, &[&bytes], &signature) {
            debug!(credential = %payload.id, "signature mismatch");
            return Err(ValidationFailure::SignatureMismatch);
        }

        if payload.expires_at.is_past(now) {
            return Err(ValidationFailure::Expired);
        }

        if let Some(provider) = &self.status_provider {
            match provider.status(&payload.id) {
                Some(CredentialStatus::Active) | None => {}
                Some(CredentialStatus::Invalidated) => {
                    return Err(ValidationFailure::Invalidated)
                }
                Some(status) => return Err(ValidationFailure::Closed(status)),
            }
        }

        Ok(LoanView {
            credential_id: payload.id.clone(),
            loan_id: payload.loan_id.clone(),
            applicant: payload.applicant.clone(),
            loan: payload.loan.clone(),
            expires_at: payload.expires_at,
        })
    }
}

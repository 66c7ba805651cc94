//! Canonical byte encoding of the signed field subset.
//!
//! The signature covers exactly these fields, in this order, frozen at
//! issuance: id, loan id, applicant name/phone, the full loan terms, and
//! the issued/expiry timestamps. Counters, status, and action history are
//! deliberately outside the signed region; they mutate after issuance.
//!
//! Fields are length-delimited with a `|` separator and numbers are
//! rendered as decimal, so the encoding is deterministic and unambiguous
//! across platforms.

use vouch_types::{Applicant, CredentialId, LoanId, LoanTerms, Timestamp};

/// Encoding version, bumped if the canonical field set ever changes.
pub const CANONICAL_VERSION: u8 = 1;

/// Produce the canonical byte sequence the credential signature covers.
pub fn canonical_bytes(
    id: &CredentialId,
    loan_id: &LoanId,
    applicant: &Applicant,
    terms: &LoanTerms,
    issued_at: Timestamp,
    expires_at: Timestamp,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);
    push_field(&mut out, &format!("v{CANONICAL_VERSION}"));
    push_field(&mut out, id.as_str());
    push_field(&mut out, loan_id.as_str());
    push_field(&mut out, &applicant.name);
    push_field(&mut out, &applicant.phone);
    push_field(&mut out, &terms.amount_minor.to_string());
    push_field(&mut out, &terms.currency);
    push_field(&mut out, &terms.tenure_months.to_string());
    push_field(&mut out, &terms.interest_rate_bps.to_string());
    push_field(&mut out, &terms.monthly_repayment_minor.to_string());
    push_field(&mut out, &terms.total_repayment_minor.to_string());
    push_field(&mut out, &terms.purpose);
    push_field(&mut out, &issued_at.as_secs().to_string());
    push_field(&mut out, &expires_at.as_secs().to_string());
    out
}

/// Append one field as `<len>|<bytes>` so field boundaries can never be
/// forged by embedding separators in values.
fn push_field(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(value.len().to_string().as_bytes());
    out.push(b'|');
    out.extend_from_slice(value.as_bytes());
}

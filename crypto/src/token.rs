//! Realtime access tokens.
//!
//! A token binds a subject (the authenticated user id) to an expiry time
//! under the server MAC key: `subject.expires.tag`. Session issuance lives
//! in the outer auth service; this module only mints for tests and verifies
//! for the realtime hub, so identity is always derived from a verified
//! token rather than trusted from a raw header.

use crate::mac::{hmac_sha256_multi, verify_hmac_sha256, SigningKey};
use thiserror::Error;
use vouch_types::Timestamp;

/// The identity carried by a verified token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

/// Mint a token for `subject` valid until `expires_at`.
pub fn mint_token(key: &SigningKey, subject: &str, expires_at: Timestamp) -> String {
    let expires = expires_at.as_secs().to_string();
    let tag = hmac_sha256_multi(key, &[subject.as_bytes(), b".", expires.as_bytes()]);
    format!("{subject}.{expires}.{}", hex::encode(tag))
}

/// Verify a token and return the identity it carries.
///
/// Signature is checked before expiry so a tampered expiry field can never
/// extend a token's life.
pub fn verify_token(key: &SigningKey, token: &str, now: Timestamp) -> Result<Identity, TokenError> {
    let mut parts = token.rsplitn(3, '.');
    let tag_hex = parts.next().ok_or(TokenError::Malformed)?;
    let expires_str = parts.next().ok_or(TokenError::Malformed)?;
    let subject = parts.next().ok_or(TokenError::Malformed)?;
    if subject.is_empty() {
        return Err(TokenError::Malformed);
    }

    let tag = hex::decode(tag_hex).map_err(|_| TokenError::Malformed)?;
    if !verify_hmac_sha256(
        key,
        &[subject.as_bytes(), b".", expires_str.as_bytes()],
        &tag,
    ) {
        return Err(TokenError::BadSignature);
    }

    let expires: u64 = expires_str.parse().map_err(|_| TokenError::Malformed)?;
    if Timestamp::new(expires).is_past(now) {
        return Err(TokenError::Expired);
    }

    Ok(Identity {
        subject: subject.to_string(),
    })
}

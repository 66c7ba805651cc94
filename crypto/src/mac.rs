//! HMAC-SHA256 signing and constant-time verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// A server-held secret used to key credential and token MACs.
///
/// The key never leaves the process; only MAC outputs are embedded in
/// credentials.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("SigningKey(..)")
    }
}

/// Compute an HMAC-SHA256 tag over a single byte slice.
pub fn hmac_sha256(key: &SigningKey, data: &[u8]) -> [u8; 32] {
    hmac_sha256_multi(key, &[data])
}

/// Compute an HMAC-SHA256 tag over multiple byte slices in sequence
/// (avoids concatenation allocation).
pub fn hmac_sha256_multi(key: &SigningKey, parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    for part in parts {
        mac.update(part);
    }
    let result = mac.finalize().into_bytes();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Verify a tag over the given parts in constant time.
pub fn verify_hmac_sha256(key: &SigningKey, parts: &[&[u8]], tag: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SigningKey {
        SigningKey::new(b"test-secret".to_vec())
    }

    #[test]
    fn mac_is_deterministic() {
        let t1 = hmac_sha256(&key(), b"loan credential");
        let t2 = hmac_sha256(&key(), b"loan credential");
        assert_eq!(t1, t2);
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(hmac_sha256(&key(), b"a"), hmac_sha256(&key(), b"b"));
    }

    #[test]
    fn different_keys_differ() {
        let other = SigningKey::new(b"other-secret".to_vec());
        assert_ne!(hmac_sha256(&key(), b"a"), hmac_sha256(&other, b"a"));
    }

    #[test]
    fn multi_equivalent_to_concat() {
        let single = hmac_sha256(&key(), b"helloworld");
        let multi = hmac_sha256_multi(&key(), &[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn verify_accepts_and_rejects() {
        let tag = hmac_sha256(&key(), b"payload");
        assert!(verify_hmac_sha256(&key(), &[b"payload"], &tag));
        assert!(!verify_hmac_sha256(&key(), &[b"tampered"], &tag));
        let mut bad = tag;
        bad[0] ^= 1;
        assert!(!verify_hmac_sha256(&key(), &[b"payload"], &bad));
    }
}

//! Collision-resistant credential id generation.

use vouch_types::CredentialId;

/// Generate a fresh credential id: `CRED-` + 16 uppercase hex characters
/// (64 bits of secure randomness).
pub fn random_credential_id() -> CredentialId {
    let mut bytes = [0u8; 8];
    // getrandom only fails when the OS entropy source is unavailable, in
    // which case issuing credentials at all would be unsafe.
    getrandom::getrandom(&mut bytes).unwrap_or_else(|_| {
        panic!("OS random source unavailable");
    });
    CredentialId::new(format!(
        "{}{}",
        CredentialId::PREFIX,
        hex::encode_upper(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid() {
        let id = random_credential_id();
        assert!(id.is_valid());
        assert_eq!(id.as_str().len(), CredentialId::PREFIX.len() + 16);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(random_credential_id(), random_credential_id());
    }
}

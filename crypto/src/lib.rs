//! Cryptographic primitives for the vouch service.
//!
//! - **HMAC-SHA256** for credential signatures and realtime access tokens
//!   (keyed message authentication with a server-held secret, not reversible)
//! - Constant-time verification for everything tag-shaped
//! - Secure random material for credential ids

pub mod id;
pub mod mac;
pub mod token;

pub use id::random_credential_id;
pub use mac::{hmac_sha256, hmac_sha256_multi, verify_hmac_sha256, SigningKey};
pub use token::{mint_token, verify_token, Identity, TokenError};

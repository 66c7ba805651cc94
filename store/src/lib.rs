//! Credential repository abstraction.
//!
//! Persistence is an external collaborator; the rest of the workspace only
//! depends on the [`CredentialStore`] trait. [`MemoryStore`] backs tests
//! and single-process deployments; a durable backend implements the same
//! trait in production.

pub mod error;
pub mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use vouch_types::{Credential, CredentialId, CredentialStatus};

/// Status filter for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(CredentialStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: CredentialStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => *s == status,
        }
    }
}

/// A page of credentials plus the total match count (pre-pagination).
#[derive(Clone, Debug)]
pub struct CredentialPage {
    pub items: Vec<Credential>,
    pub total: u64,
}

/// Storage operations the service needs from a credential repository.
pub trait CredentialStore: Send + Sync {
    fn get(&self, id: &CredentialId) -> Result<Credential, StoreError>;

    /// Insert or replace the full credential record.
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Update only the status of a stored credential.
    fn update_status(&self, id: &CredentialId, status: CredentialStatus)
        -> Result<(), StoreError>;

    /// List credentials matching `filter`, newest first, with offset/limit
    /// pagination.
    fn list_by_status(
        &self,
        filter: StatusFilter,
        offset: u64,
        limit: u32,
    ) -> Result<CredentialPage, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;
}

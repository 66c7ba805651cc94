//! In-memory credential store.
//!
//! Thread-safe for use with tokio's multi-threaded runtime; the mutex only
//! guards short map operations.

use crate::{CredentialPage, CredentialStore, StatusFilter, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;
use vouch_types::{Credential, CredentialId, CredentialStatus};

/// HashMap-backed [`CredentialStore`] keeping insertion order for listings.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    credentials: HashMap<CredentialId, Credential>,
    // Insertion order, newest last; listings walk it in reverse.
    order: Vec<CredentialId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                credentials: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, id: &CredentialId) -> Result<Credential, StoreError> {
        let inner = self.inner.lock().map_err(poisoned)?;
        inner
            .credentials
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        if !inner.credentials.contains_key(&credential.id) {
            inner.order.push(credential.id.clone());
        }
        inner
            .credentials
            .insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    fn update_status(
        &self,
        id: &CredentialId,
        status: CredentialStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().map_err(poisoned)?;
        let cred = inner
            .credentials
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        cred.status = status;
        Ok(())
    }

    fn list_by_status(
        &self,
        filter: StatusFilter,
        offset: u64,
        limit: u32,
    ) -> Result<CredentialPage, StoreError> {
        let inner = self.inner.lock().map_err(poisoned)?;
        let matching: Vec<&Credential> = inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.credentials.get(id))
            .filter(|c| filter.matches(c.status))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(CredentialPage { items, total })
    }

    fn count(&self) -> Result<u64, StoreError> {
        let inner = self.inner.lock().map_err(poisoned)?;
        Ok(inner.credentials.len() as u64)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend("store mutex poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_types::{Applicant, LoanId, LoanTerms, Timestamp};

    fn cred(id: &str, status: CredentialStatus) -> Credential {
        Credential {
            id: CredentialId::new(id),
            loan_id: LoanId::new("LOAN-X"),
            applicant: Applicant::new("Jane", "+2348000000001"),
            loan: LoanTerms {
                amount_minor: 1,
                currency: "NGN".into(),
                tenure_months: 1,
                interest_rate_bps: 0,
                monthly_repayment_minor: 1,
                total_repayment_minor: 1,
                purpose: "p".into(),
            },
            signature: "00".into(),
            issued_at: Timestamp::new(1),
            expires_at: Timestamp::new(2),
            status,
            scan_count: 0,
            guarantors_found: 0,
            guarantors_required: 3,
            actions: Vec::new(),
        }
    }

    #[test]
    fn save_then_get() {
        let store = MemoryStore::new();
        store.save(&cred("CRED-A", CredentialStatus::Active)).unwrap();
        let got = store.get(&CredentialId::new("CRED-A")).unwrap();
        assert_eq!(got.id.as_str(), "CRED-A");
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get(&CredentialId::new("CRED-NOPE")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn update_status_persists() {
        let store = MemoryStore::new();
        store.save(&cred("CRED-A", CredentialStatus::Active)).unwrap();
        store
            .update_status(&CredentialId::new("CRED-A"), CredentialStatus::Invalidated)
            .unwrap();
        let got = store.get(&CredentialId::new("CRED-A")).unwrap();
        assert_eq!(got.status, CredentialStatus::Invalidated);
    }

    #[test]
    fn listing_filters_and_paginates_newest_first() {
        let store = MemoryStore::new();
        store.save(&cred("CRED-A", CredentialStatus::Active)).unwrap();
        store.save(&cred("CRED-B", CredentialStatus::Expired)).unwrap();
        store.save(&cred("CRED-C", CredentialStatus::Active)).unwrap();

        let page = store
            .list_by_status(StatusFilter::Only(CredentialStatus::Active), 0, 10)
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id.as_str(), "CRED-C");
        assert_eq!(page.items[1].id.as_str(), "CRED-A");

        let page = store.list_by_status(StatusFilter::All, 1, 1).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id.as_str(), "CRED-B");
    }

    #[test]
    fn resave_does_not_duplicate() {
        let store = MemoryStore::new();
        store.save(&cred("CRED-A", CredentialStatus::Active)).unwrap();
        store.save(&cred("CRED-A", CredentialStatus::Active)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let page = store.list_by_status(StatusFilter::All, 0, 10).unwrap();
        assert_eq!(page.total, 1);
    }
}

//! The progress tracker.

use crate::error::ProgressError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};
use vouch_types::{
    ActionKind, Credential, CredentialId, CredentialStatus, DeviceId, Guarantor, GuarantorAction,
    LoanId, ProgressSnapshot, Timestamp,
};

/// Counters exposed for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub tracked: usize,
    pub active: usize,
    pub completed: usize,
}

/// Owns one authoritative record per credential.
///
/// The outer map lock is held only to locate a record; all state mutation
/// happens under the record's own mutex, so concurrent `record_action`
/// calls on the same credential serialize while different credentials
/// never contend.
pub struct ProgressTracker {
    records: RwLock<HashMap<CredentialId, Arc<Mutex<Credential>>>>,
    loan_index: RwLock<HashMap<LoanId, CredentialId>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            loan_index: RwLock::new(HashMap::new()),
        }
    }

    /// Admit an issued credential for tracking. Idempotent by id; an
    /// already-tracked credential keeps its current state.
    pub fn register(&self, credential: Credential) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&credential.id) {
            return;
        }
        let mut index = self
            .loan_index
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        index.insert(credential.loan_id.clone(), credential.id.clone());
        records.insert(credential.id.clone(), Arc::new(Mutex::new(credential)));
    }

    /// Record a guarantor action and return the new snapshot.
    ///
    /// Rules:
    /// - closed (non-active) credentials reject with [`ProgressError::Closed`];
    ///   expiry is applied lazily here first
    /// - the same guarantor (name + phone) acting twice updates their
    ///   existing entry instead of double-counting
    /// - `Approved` raises `guarantors_found` up to, never beyond,
    ///   `guarantors_required`; `Viewed`/`Declined` only bump `scan_count`
    /// - reaching the requirement flips status to `Completed` (terminal)
    pub fn record_action(
        &self,
        id: &CredentialId,
        guarantor: Guarantor,
        action: ActionKind,
        device_id: DeviceId,
        now: Timestamp,
    ) -> Result<ProgressSnapshot, ProgressError> {
        let record = self.record(id)?;
        let mut cred = record.lock().unwrap_or_else(PoisonError::into_inner);

        apply_lazy_expiry(&mut cred, now);
        if cred.status != CredentialStatus::Active {
            return Err(ProgressError::Closed(cred.status));
        }

        let key = guarantor.dedup_key();
        let entry = GuarantorAction {
            guarantor,
            action,
            timestamp: now,
            device_id,
        };
        match cred
            .actions
            .iter_mut()
            .find(|a| a.guarantor.dedup_key() == key)
        {
            Some(existing) => *existing = entry,
            None => cred.actions.push(entry),
        }
        cred.scan_count = cred.scan_count.saturating_add(1);

        // Recompute from history so a repeat approval can never double-count
        // and a changed answer is reflected, clamped to the requirement.
        let approved = cred
            .actions
            .iter()
            .filter(|a| a.action == ActionKind::Approved)
            .count() as u32;
        cred.guarantors_found = approved.min(cred.guarantors_required);

        if cred.guarantors_found == cred.guarantors_required {
            cred.status = CredentialStatus::Completed;
            info!(credential = %cred.id, loan = %cred.loan_id, "all guarantors found, credential completed");
        } else {
            debug!(
                credential = %cred.id,
                found = cred.guarantors_found,
                required = cred.guarantors_required,
                action = %action,
                "guarantor action recorded"
            );
        }

        Ok(ProgressSnapshot::from_counts(
            cred.guarantors_found,
            cred.guarantors_required,
        ))
    }

    /// Current snapshot for a credential. Side-effect-free.
    pub fn snapshot(&self, id: &CredentialId) -> Result<ProgressSnapshot, ProgressError> {
        let record = self.record(id)?;
        let cred = record.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ProgressSnapshot::from_counts(
            cred.guarantors_found,
            cred.guarantors_required,
        ))
    }

    /// Snapshot looked up by loan id (for realtime late joiners).
    pub fn snapshot_for_loan(&self, loan_id: &LoanId) -> Option<ProgressSnapshot> {
        let id = {
            let index = self
                .loan_index
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            index.get(loan_id).cloned()?
        };
        self.snapshot(&id).ok()
    }

    /// Authoritative status, applying lazy expiry.
    pub fn status(&self, id: &CredentialId, now: Timestamp) -> Option<CredentialStatus> {
        let record = self.record(id).ok()?;
        let mut cred = record.lock().unwrap_or_else(PoisonError::into_inner);
        apply_lazy_expiry(&mut cred, now);
        Some(cred.status)
    }

    /// Full current record (for persistence after a transition).
    pub fn credential(&self, id: &CredentialId) -> Result<Credential, ProgressError> {
        let record = self.record(id)?;
        let cred = record.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cred.clone())
    }

    /// Transition `Active -> Invalidated`.
    ///
    /// Idempotent on an already-invalidated credential; rejects with
    /// [`ProgressError::Closed`] when completed or expired.
    pub fn invalidate(&self, id: &CredentialId, now: Timestamp) -> Result<(), ProgressError> {
        let record = self.record(id)?;
        let mut cred = record.lock().unwrap_or_else(PoisonError::into_inner);
        apply_lazy_expiry(&mut cred, now);
        match cred.status {
            CredentialStatus::Active => {
                cred.status = CredentialStatus::Invalidated;
                info!(credential = %cred.id, "credential invalidated");
                Ok(())
            }
            CredentialStatus::Invalidated => Ok(()),
            status => Err(ProgressError::Closed(status)),
        }
    }

    pub fn stats(&self) -> TrackerStats {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = TrackerStats {
            tracked: records.len(),
            ..Default::default()
        };
        for record in records.values() {
            let cred = record.lock().unwrap_or_else(PoisonError::into_inner);
            match cred.status {
                CredentialStatus::Active => stats.active += 1,
                CredentialStatus::Completed => stats.completed += 1,
                _ => {}
            }
        }
        stats
    }

    fn record(&self, id: &CredentialId) -> Result<Arc<Mutex<Credential>>, ProgressError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(id)
            .cloned()
            .ok_or_else(|| ProgressError::NotFound(id.to_string()))
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// `Active -> Expired` once the deadline passes; evaluated wherever a
/// record is touched, never by a timer.
fn apply_lazy_expiry(cred: &mut Credential, now: Timestamp) {
    if cred.status == CredentialStatus::Active && cred.is_expired(now) {
        cred.status = CredentialStatus::Expired;
        info!(credential = %cred.id, "credential expired (lazy check)");
    }
}

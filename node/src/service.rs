//! The guarantor service: every operation exposed to collaborators.
//!
//! The outer request layer (HTTP routing, request validation, sessions)
//! lives elsewhere; it calls these methods and maps [`VouchError`] codes
//! onto its responses. Broadcast and audit are best-effort side channels:
//! their failures never roll back the state transition that triggered them.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use vouch_audit::{AuditAction, AuditEvent, AuditHealth, AuditRecorder};
use vouch_credential::{
    CredentialPayload, IssueOptions, Issuer, LoanView, StatusProvider, Verifier,
};
use vouch_crypto::SigningKey;
use vouch_progress::{ProgressTracker, TrackerStats};
use vouch_store::{CredentialStore, StatusFilter};
use vouch_types::{
    ActionKind, Applicant, Credential, CredentialId, CredentialStatus, DeviceId, Guarantor,
    LoanId, LoanTerms, ProgressSnapshot, Timestamp, VouchError,
};
use vouch_websocket::{HubStats, RealtimeHub, ServerMessage};

/// Default page size for listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Maximum page size for listings.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Pagination metadata echoed with every listing.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

/// One page of credentials with progress attached to each entry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialListing {
    pub items: Vec<ListedCredential>,
    pub pagination: PaginationMeta,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedCredential {
    #[serde(flatten)]
    pub credential: Credential,
    pub progress: ProgressSnapshot,
}

/// Aggregated observability counters.
#[derive(Clone, Copy, Debug)]
pub struct ServiceStats {
    pub tracker: TrackerStats,
    pub hub: HubStats,
    pub audit: AuditHealth,
    pub stored: u64,
}

// Strict-mode verifier consults the tracker's authoritative status.
struct TrackerStatus(Arc<ProgressTracker>);

impl StatusProvider for TrackerStatus {
    fn status(&self, id: &CredentialId) -> Option<CredentialStatus> {
        self.0.status(id, Timestamp::now())
    }
}

/// Wires issuer, verifier, tracker, store, audit, and hub together.
pub struct GuarantorService {
    issuer: Issuer,
    verifier: Verifier,
    tracker: Arc<ProgressTracker>,
    store: Arc<dyn CredentialStore>,
    audit: Arc<AuditRecorder>,
    hub: Arc<RealtimeHub>,
}

impl GuarantorService {
    /// Assemble a service around a shared secret and a credential store.
    ///
    /// `strict_validation` switches the verifier to online mode, where a
    /// credential the tracker knows to be closed is rejected at scan time.
    pub fn new(
        secret: &str,
        store: Arc<dyn CredentialStore>,
        audit_capacity: usize,
        strict_validation: bool,
    ) -> Self {
        let key = SigningKey::new(secret.as_bytes().to_vec());
        let tracker = Arc::new(ProgressTracker::new());
        let verifier = if strict_validation {
            Verifier::with_status_provider(key.clone(), Box::new(TrackerStatus(tracker.clone())))
        } else {
            Verifier::new(key.clone())
        };
        let hub = Arc::new(RealtimeHub::new(key.clone(), tracker.clone()));
        Self {
            issuer: Issuer::new(key),
            verifier,
            tracker,
            store,
            audit: Arc::new(AuditRecorder::with_capacity(audit_capacity)),
            hub,
        }
    }

    /// The hub instance, for wiring into the WebSocket server.
    pub fn hub(&self) -> Arc<RealtimeHub> {
        self.hub.clone()
    }

    pub fn audit(&self) -> Arc<AuditRecorder> {
        self.audit.clone()
    }

    /// Issue a signed credential for a loan and admit it for tracking.
    pub fn issue(
        &self,
        loan_id: LoanId,
        applicant: Applicant,
        terms: LoanTerms,
        options: IssueOptions,
        actor: &str,
    ) -> Result<Credential, VouchError> {
        let credential =
            self.issuer
                .issue(loan_id, applicant, terms, options, Timestamp::now())?;
        if let Err(e) = self.store.save(&credential) {
            // Without a stored record the credential would be untrackable.
            return Err(VouchError::Internal(e.to_string()));
        }
        self.tracker.register(credential.clone());
        self.record_audit(
            AuditAction::CredentialIssued,
            actor,
            Some(credential.loan_id.clone()),
            Some(credential.id.clone()),
            format!("issued credential expiring at {}", credential.expires_at),
        );
        Ok(credential)
    }

    /// The scannable payload for an issued credential.
    pub fn payload(&self, id: &CredentialId) -> Result<CredentialPayload, VouchError> {
        let credential = self
            .store
            .get(id)
            .map_err(|e| VouchError::NotFound(e.to_string()))?;
        Ok(CredentialPayload::from_credential(&credential))
    }

    /// Validate a scanned payload.
    pub fn validate(&self, raw_payload: &str, actor: &str) -> Result<LoanView, VouchError> {
        let view = self.verifier.validate(raw_payload, Timestamp::now())?;
        self.record_audit(
            AuditAction::CredentialValidated,
            actor,
            Some(view.loan_id.clone()),
            Some(view.credential_id.clone()),
            "validated scanned credential".to_string(),
        );
        Ok(view)
    }

    /// Record a guarantor response, persist the new state, and notify
    /// realtime subscribers of the loan.
    pub fn record_action(
        &self,
        id: &CredentialId,
        guarantor: Guarantor,
        action: ActionKind,
        device_id: DeviceId,
    ) -> Result<ProgressSnapshot, VouchError> {
        let now = Timestamp::now();
        let snapshot =
            self.tracker
                .record_action(id, guarantor.clone(), action, device_id, now)?;

        // The tracker is authoritative; persistence and notification are
        // follow-on effects that must not undo the recorded action.
        match self.tracker.credential(id) {
            Ok(credential) => {
                let loan_id = credential.loan_id.clone();
                if let Err(e) = self.store.save(&credential) {
                    warn!(credential = %id, error = %e, "failed to persist recorded action");
                }
                self.record_audit(
                    AuditAction::GuarantorAction,
                    &guarantor.name,
                    Some(loan_id.clone()),
                    Some(id.clone()),
                    format!("guarantor {} {} the loan request", guarantor.name, action),
                );
                self.hub.broadcast(
                    &loan_id,
                    &ServerMessage::GuarantorAction {
                        loan_id: loan_id.clone(),
                        action,
                        guarantor,
                        timestamp: now,
                    },
                );
                self.hub.broadcast(
                    &loan_id,
                    &ServerMessage::Progress {
                        loan_id: loan_id.clone(),
                        snapshot,
                    },
                );
                self.record_audit(
                    AuditAction::ProgressBroadcast,
                    "system",
                    Some(loan_id),
                    Some(id.clone()),
                    format!("progress {}/{} broadcast", snapshot.found, snapshot.required),
                );
            }
            Err(e) => warn!(credential = %id, error = %e, "recorded action but lost the record"),
        }

        Ok(snapshot)
    }

    /// Invalidate an active credential.
    pub fn invalidate(&self, id: &CredentialId, actor: &str) -> Result<(), VouchError> {
        self.tracker.invalidate(id, Timestamp::now())?;
        if let Err(e) = self
            .store
            .update_status(id, CredentialStatus::Invalidated)
        {
            warn!(credential = %id, error = %e, "failed to persist invalidation");
        }
        self.record_audit(
            AuditAction::CredentialInvalidated,
            actor,
            None,
            Some(id.clone()),
            format!("invalidated credential {id}"),
        );
        Ok(())
    }

    /// Current progress snapshot. Side-effect-free.
    pub fn get_snapshot(&self, id: &CredentialId) -> Result<ProgressSnapshot, VouchError> {
        Ok(self.tracker.snapshot(id)?)
    }

    /// List stored credentials by status with page/limit pagination.
    ///
    /// `status` accepts a concrete status or "all"; `page` starts at 1 and
    /// `limit` is clamped to [`MAX_PAGE_LIMIT`].
    pub fn list_by_status(
        &self,
        status: &str,
        page: u32,
        limit: u32,
    ) -> Result<CredentialListing, VouchError> {
        let filter = parse_status_filter(status)?;
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let offset = u64::from(page - 1) * u64::from(limit);

        let result = self
            .store
            .list_by_status(filter, offset, limit)
            .map_err(|e| VouchError::Internal(e.to_string()))?;

        let total_pages = result.total.div_ceil(u64::from(limit));
        let has_more = offset + (result.items.len() as u64) < result.total;
        let items = result
            .items
            .into_iter()
            .map(|credential| {
                let progress = ProgressSnapshot::from_counts(
                    credential.guarantors_found,
                    credential.guarantors_required,
                );
                ListedCredential {
                    credential,
                    progress,
                }
            })
            .collect();

        Ok(CredentialListing {
            items,
            pagination: PaginationMeta {
                page,
                limit,
                total: result.total,
                total_pages,
                has_more,
            },
        })
    }

    /// Aggregated counters for observability.
    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            tracker: self.tracker.stats(),
            hub: self.hub.stats(),
            audit: self.audit.health(),
            stored: self.store.count().unwrap_or(0),
        }
    }

    fn record_audit(
        &self,
        action: AuditAction,
        actor: &str,
        loan_id: Option<LoanId>,
        credential_id: Option<CredentialId>,
        detail: String,
    ) {
        self.audit.record(AuditEvent {
            action,
            actor: actor.to_string(),
            loan_id,
            credential_id,
            detail,
            timestamp: Timestamp::now(),
        });
    }
}

fn parse_status_filter(status: &str) -> Result<StatusFilter, VouchError> {
    match status {
        "all" => Ok(StatusFilter::All),
        "active" => Ok(StatusFilter::Only(CredentialStatus::Active)),
        "completed" => Ok(StatusFilter::Only(CredentialStatus::Completed)),
        "expired" => Ok(StatusFilter::Only(CredentialStatus::Expired)),
        "invalidated" => Ok(StatusFilter::Only(CredentialStatus::Invalidated)),
        other => Err(VouchError::Validation(format!(
            "unknown status filter: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_store::MemoryStore;

    fn service() -> GuarantorService {
        GuarantorService::new("test-secret", Arc::new(MemoryStore::new()), 100, true)
    }

    fn sample_terms() -> LoanTerms {
        LoanTerms {
            amount_minor: 50_000_000,
            currency: "NGN".into(),
            tenure_months: 12,
            interest_rate_bps: 1000,
            monthly_repayment_minor: 4_583_300,
            total_repayment_minor: 55_000_000,
            purpose: "Business expansion".into(),
        }
    }

    fn issue(service: &GuarantorService, loan: &str) -> Credential {
        service
            .issue(
                LoanId::new(loan),
                Applicant::new("John Doe", "+2348012345678"),
                sample_terms(),
                IssueOptions::default(),
                "user-1",
            )
            .unwrap()
    }

    #[test]
    fn issue_persists_and_tracks() {
        let svc = service();
        let cred = issue(&svc, "LOAN-TEST");
        let snapshot = svc.get_snapshot(&cred.id).unwrap();
        assert_eq!((snapshot.found, snapshot.required), (0, 3));
        assert_eq!(svc.stats().stored, 1);
        assert_eq!(svc.stats().tracker.active, 1);
    }

    #[test]
    fn status_filter_parsing() {
        assert!(parse_status_filter("all").is_ok());
        assert!(parse_status_filter("active").is_ok());
        assert!(matches!(
            parse_status_filter("bogus"),
            Err(VouchError::Validation(_))
        ));
    }

    #[test]
    fn listing_paginates() {
        let svc = service();
        for n in 0..5 {
            issue(&svc, &format!("LOAN-{n}"));
        }
        let listing = svc.list_by_status("active", 1, 2).unwrap();
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.pagination.total, 5);
        assert_eq!(listing.pagination.total_pages, 3);
        assert!(listing.pagination.has_more);

        let listing = svc.list_by_status("active", 3, 2).unwrap();
        assert_eq!(listing.items.len(), 1);
        assert!(!listing.pagination.has_more);
    }

    #[test]
    fn invalidate_then_strict_validation_rejects() {
        let svc = service();
        let cred = issue(&svc, "LOAN-TEST");
        let raw = svc.payload(&cred.id).unwrap().to_json();
        assert!(svc.validate(&raw, "scanner").is_ok());

        svc.invalidate(&cred.id, "user-1").unwrap();
        let err = svc.validate(&raw, "scanner").unwrap_err();
        assert!(matches!(err, VouchError::Closed(_)));
        // Store reflects the terminal status too.
        let listing = svc.list_by_status("invalidated", 1, 10).unwrap();
        assert_eq!(listing.pagination.total, 1);
    }

    #[test]
    fn record_action_updates_store_copy() {
        let svc = service();
        let cred = issue(&svc, "LOAN-TEST");
        svc.record_action(
            &cred.id,
            Guarantor::new("Jane", "+2348000000001"),
            ActionKind::Approved,
            DeviceId::new("device-1"),
        )
        .unwrap();
        let listing = svc.list_by_status("active", 1, 10).unwrap();
        assert_eq!(listing.items[0].credential.guarantors_found, 1);
        assert_eq!(listing.items[0].credential.scan_count, 1);
        assert_eq!(listing.items[0].progress.percentage, 33);
    }

    #[test]
    fn audit_trail_accumulates() {
        let svc = service();
        let cred = issue(&svc, "LOAN-TEST");
        svc.record_action(
            &cred.id,
            Guarantor::new("Jane", "+2348000000001"),
            ActionKind::Viewed,
            DeviceId::new("device-1"),
        )
        .unwrap();
        let health = svc.stats().audit;
        // Issue + guarantor action + progress broadcast at minimum.
        assert!(health.recorded >= 3);
        assert_eq!(health.dropped, 0);
    }
}

//! Best-effort audit recording.
//!
//! `record` never returns an error: audit is a side channel, not part of
//! the transactional contract of the components that call it. Failures
//! (here, only capacity drops) are visible through [`AuditRecorder::health`].

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::info;
use vouch_types::{CredentialId, LoanId, Timestamp};

/// Default bound on retained events; beyond it the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Lifecycle action recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CredentialIssued,
    CredentialValidated,
    GuarantorAction,
    ProgressBroadcast,
    CredentialInvalidated,
}

/// One append-only audit entry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    /// Who triggered the event (user id, guarantor name, or "system").
    pub actor: String,
    pub loan_id: Option<LoanId>,
    pub credential_id: Option<CredentialId>,
    pub detail: String,
    pub timestamp: Timestamp,
}

/// Health counters for the audit side channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditHealth {
    pub recorded: u64,
    pub dropped: u64,
}

struct Inner {
    events: VecDeque<AuditEvent>,
    health: AuditHealth,
}

/// Append-only, bounded, in-memory audit log.
pub struct AuditRecorder {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl AuditRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                events: VecDeque::new(),
                health: AuditHealth::default(),
            }),
        }
    }

    /// Append an event. Infallible by contract; a full log drops its
    /// oldest entry and counts the drop.
    pub fn record(&self, event: AuditEvent) {
        info!(
            action = ?event.action,
            actor = %event.actor,
            detail = %event.detail,
            "audit"
        );
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.events.len() == self.capacity {
            inner.events.pop_front();
            inner.health.dropped += 1;
        }
        inner.events.push_back(event);
        inner.health.recorded += 1;
    }

    /// The most recent `limit` events, newest last.
    pub fn tail(&self, limit: usize) -> Vec<AuditEvent> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = inner.events.len().saturating_sub(limit);
        inner.events.iter().skip(skip).cloned().collect()
    }

    pub fn health(&self) -> AuditHealth {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.health
    }
}

impl Default for AuditRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: u64) -> AuditEvent {
        AuditEvent {
            action: AuditAction::GuarantorAction,
            actor: format!("guarantor-{n}"),
            loan_id: Some(LoanId::new("LOAN-TEST")),
            credential_id: Some(CredentialId::new("CRED-A")),
            detail: format!("event {n}"),
            timestamp: Timestamp::new(n),
        }
    }

    #[test]
    fn records_in_order() {
        let audit = AuditRecorder::new();
        for n in 0..5 {
            audit.record(event(n));
        }
        let tail = audit.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].detail, "event 2");
        assert_eq!(tail[2].detail, "event 4");
        assert_eq!(audit.health(), AuditHealth { recorded: 5, dropped: 0 });
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let audit = AuditRecorder::with_capacity(2);
        for n in 0..5 {
            audit.record(event(n));
        }
        let tail = audit.tail(10);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].detail, "event 3");
        assert_eq!(audit.health(), AuditHealth { recorded: 5, dropped: 3 });
    }
}

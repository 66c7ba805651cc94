//! The realtime hub: per-loan subscriber registries and broadcast fan-out.

use crate::messages::ServerMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vouch_crypto::{verify_token, Identity, SigningKey};
use vouch_progress::ProgressTracker;
use vouch_types::{LoanId, ProgressSnapshot, Timestamp};

/// Identifies one live connection for the lifetime of its socket.
pub type ConnectionId = u64;

/// Where the hub fetches the current snapshot a late joiner must see.
pub trait SnapshotSource: Send + Sync {
    fn snapshot_for_loan(&self, loan_id: &LoanId) -> Option<ProgressSnapshot>;
}

impl SnapshotSource for ProgressTracker {
    fn snapshot_for_loan(&self, loan_id: &LoanId) -> Option<ProgressSnapshot> {
        ProgressTracker::snapshot_for_loan(self, loan_id)
    }
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Observability counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Connections currently registered.
    pub connections: usize,
    /// (connection, loan) subscription pairs.
    pub subscriptions: usize,
    /// Loans with at least one subscriber.
    pub loans: usize,
}

struct Subscriber {
    conn_id: ConnectionId,
    // Buffered per-connection queue; sending never blocks the hub, and a
    // closed receiver marks the connection dead.
    sender: mpsc::UnboundedSender<String>,
}

/// Connection/subscription registry and broadcaster.
///
/// The outer map lock is only held to locate a loan's subscriber set; each
/// set has its own mutex so subscribe/unsubscribe/broadcast on different
/// loans never contend.
pub struct RealtimeHub {
    token_key: SigningKey,
    snapshots: Arc<dyn SnapshotSource>,
    next_conn_id: AtomicU64,
    loans: RwLock<HashMap<LoanId, Arc<Mutex<Vec<Subscriber>>>>>,
    // Reverse index: which loans each connection subscribed to.
    connections: RwLock<HashMap<ConnectionId, Vec<LoanId>>>,
}

impl RealtimeHub {
    pub fn new(token_key: SigningKey, snapshots: Arc<dyn SnapshotSource>) -> Self {
        Self {
            token_key,
            snapshots,
            next_conn_id: AtomicU64::new(1),
            loans: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Verify a client token. The server closes the connection when this
    /// fails; identity is only ever derived from a verified token.
    pub fn authenticate(&self, token: &str, now: Timestamp) -> Result<Identity, HubError> {
        verify_token(&self.token_key, token, now).map_err(|e| HubError::Auth(e.to_string()))
    }

    /// Admit a new (authenticated) connection.
    pub fn register_connection(&self) -> ConnectionId {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conn_id, Vec::new());
        debug!(conn = conn_id, "connection registered");
        conn_id
    }

    /// Register `conn_id` under `loan_id` and immediately push the current
    /// progress snapshot, so late joiners see current state rather than
    /// only future deltas.
    pub fn subscribe(
        &self,
        conn_id: ConnectionId,
        loan_id: LoanId,
        sender: mpsc::UnboundedSender<String>,
    ) {
        let set = {
            let mut loans = self.loans.write().unwrap_or_else(PoisonError::into_inner);
            loans
                .entry(loan_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
                .clone()
        };
        {
            let mut subs = set.lock().unwrap_or_else(PoisonError::into_inner);
            subs.retain(|s| s.conn_id != conn_id);
            subs.push(Subscriber {
                conn_id,
                sender: sender.clone(),
            });
        }
        {
            let mut connections = self
                .connections
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let loans = connections.entry(conn_id).or_default();
            if !loans.contains(&loan_id) {
                loans.push(loan_id.clone());
            }
        }

        let _ = sender.send(
            ServerMessage::Subscribed {
                loan_id: loan_id.clone(),
            }
            .to_json(),
        );
        if let Some(snapshot) = self.snapshots.snapshot_for_loan(&loan_id) {
            let _ = sender.send(
                ServerMessage::Progress {
                    loan_id: loan_id.clone(),
                    snapshot,
                }
                .to_json(),
            );
        }
        debug!(conn = conn_id, loan = %loan_id, "subscribed");
    }

    /// Deliver `event` to every subscriber of `loan_id`, best effort.
    ///
    /// A failed send removes that subscriber from the set but never aborts
    /// delivery to the others and never surfaces an error to the caller.
    pub fn broadcast(&self, loan_id: &LoanId, event: &ServerMessage) {
        let set = {
            let loans = self.loans.read().unwrap_or_else(PoisonError::into_inner);
            match loans.get(loan_id) {
                Some(set) => set.clone(),
                None => return,
            }
        };

        let frame = event.to_json();
        let mut dead = Vec::new();
        {
            let mut subs = set.lock().unwrap_or_else(PoisonError::into_inner);
            subs.retain(|sub| {
                if sub.sender.send(frame.clone()).is_ok() {
                    true
                } else {
                    dead.push(sub.conn_id);
                    false
                }
            });
        }
        for conn_id in dead {
            warn!(conn = conn_id, loan = %loan_id, "pruned dead subscriber during broadcast");
            self.forget_subscription(conn_id, loan_id);
        }
    }

    /// Remove a connection from every loan set it belongs to. Idempotent;
    /// safe to call for a connection that was already pruned.
    pub fn unsubscribe(&self, conn_id: ConnectionId) {
        let loan_ids = {
            let mut connections = self
                .connections
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            connections.remove(&conn_id).unwrap_or_default()
        };
        let loans = self.loans.read().unwrap_or_else(PoisonError::into_inner);
        for loan_id in loan_ids {
            if let Some(set) = loans.get(&loan_id) {
                set.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|s| s.conn_id != conn_id);
            }
        }
        debug!(conn = conn_id, "unsubscribed from all loans");
    }

    pub fn stats(&self) -> HubStats {
        let loans = self.loans.read().unwrap_or_else(PoisonError::into_inner);
        let connections = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut subscriptions = 0;
        let mut live_loans = 0;
        for set in loans.values() {
            let len = set.lock().unwrap_or_else(PoisonError::into_inner).len();
            subscriptions += len;
            if len > 0 {
                live_loans += 1;
            }
        }
        HubStats {
            connections: connections.len(),
            subscriptions,
            loans: live_loans,
        }
    }

    /// Teardown: drop every subscriber sender (closing client queues) and
    /// release the loan-keyed sets.
    pub fn shutdown(&self) {
        let mut loans = self.loans.write().unwrap_or_else(PoisonError::into_inner);
        loans.clear();
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        connections.clear();
        debug!("realtime hub shut down");
    }

    /// Drop one (connection, loan) pair from the reverse index after a
    /// broadcast prune.
    fn forget_subscription(&self, conn_id: ConnectionId, loan_id: &LoanId) {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(loans) = connections.get_mut(&conn_id) {
            loans.retain(|l| l != loan_id);
        }
    }
}

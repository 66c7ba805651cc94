//! JSON wire envelopes exchanged over a realtime connection.
//!
//! The field names and `type` tags are part of the external contract
//! consumed by mobile/web clients; changing them breaks deployed apps.

use serde::{Deserialize, Serialize};
use vouch_types::{ActionKind, Guarantor, LoanId, ProgressSnapshot, Timestamp};

/// Messages a client may send.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Must be the first message on every connection.
    Authenticate { token: String },
    /// Register for live updates on one loan.
    SubscribeLoan {
        #[serde(rename = "loanId")]
        loan_id: LoanId,
    },
}

/// Messages the server pushes.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Authentication succeeded.
    Authenticated { subject: String },
    /// Subscription registered (the current snapshot follows immediately).
    Subscribed {
        #[serde(rename = "loanId")]
        loan_id: LoanId,
    },
    /// Current guarantor progress for a loan.
    Progress {
        #[serde(rename = "loanId")]
        loan_id: LoanId,
        snapshot: ProgressSnapshot,
    },
    /// A guarantor responded to the credential.
    GuarantorAction {
        #[serde(rename = "loanId")]
        loan_id: LoanId,
        action: ActionKind,
        guarantor: Guarantor,
        timestamp: Timestamp,
    },
    /// Sent before the server closes the connection on a protocol or
    /// authentication failure.
    Error { message: String },
}

impl ServerMessage {
    /// Serialize to the JSON text frame sent on the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"authenticate","token":"abc"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Authenticate { ref token } if token == "abc"));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe_loan","loanId":"LOAN-TEST"}"#).unwrap();
        assert!(
            matches!(msg, ClientMessage::SubscribeLoan { ref loan_id } if loan_id.as_str() == "LOAN-TEST")
        );
    }

    #[test]
    fn progress_wire_shape() {
        let frame = ServerMessage::Progress {
            loan_id: LoanId::new("LOAN-TEST"),
            snapshot: ProgressSnapshot::from_counts(2, 3),
        }
        .to_json();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "progress");
        assert_eq!(value["loanId"], "LOAN-TEST");
        assert_eq!(value["snapshot"]["found"], 2);
        assert_eq!(value["snapshot"]["percentage"], 67);
    }

    #[test]
    fn guarantor_action_wire_shape() {
        let frame = ServerMessage::GuarantorAction {
            loan_id: LoanId::new("LOAN-TEST"),
            action: ActionKind::Approved,
            guarantor: Guarantor::new("Jane", "+234"),
            timestamp: Timestamp::new(42),
        }
        .to_json();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "guarantor_action");
        assert_eq!(value["action"], "approved");
        assert_eq!(value["guarantor"]["name"], "Jane");
    }
}

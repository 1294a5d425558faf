//! Relay message envelope and payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Transaction,
    TransactionResponse,
    ApprovePairing,
    RejectPairing,
    Acknowledge,
    AdditionalAccountRequest,
    AdditionalAccountResponse,
    AuthenticationRequest,
    AuthenticationResponse,
}

/// The JSON envelope published on a relay topic.
///
/// `data` is the sealed payload: base64 over nonce-prefixed ciphertext,
/// encrypted with the topic's key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: String,
    pub topic: String,
}

impl Envelope {
    pub fn new(kind: MessageKind, data: String, topic: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            data,
            topic: topic.into(),
        }
    }
}

/// Cleartext form of a `Transaction` payload before sealing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Correlation id; the wallet echoes it in its response.
    pub id: Uuid,
    /// Hex-encoded unsigned transaction bytes.
    pub transaction: String,
    pub network: String,
}

/// Cleartext form of a `TransactionResponse` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponsePayload {
    pub id: Uuid,
    pub success: bool,
    #[serde(default)]
    pub receipt: Option<serde_json::Value>,
    /// Rejection or failure message from the wallet side.
    #[serde(default)]
    pub error: Option<String>,
}

/// Cleartext form of an `ApprovePairing` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingPayload {
    pub account: String,
    pub network: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wire_shape() {
        let envelope = Envelope::new(MessageKind::Transaction, "c2VhbGVk".into(), "topic-1");
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"type\":\"Transaction\""));
        assert!(json.contains("\"topic\":\"topic-1\""));

        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, MessageKind::Transaction);
        assert_eq!(back.data, "c2VhbGVk");
    }

    #[test]
    fn response_payload_defaults() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","success":true}"#;
        let payload: TransactionResponsePayload = serde_json::from_str(json).unwrap();
        assert!(payload.success);
        assert!(payload.receipt.is_none());
        assert!(payload.error.is_none());
    }
}

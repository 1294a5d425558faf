//! Pending-transaction record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A unique identifier for a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingId(pub Uuid);

impl PendingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PendingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PendingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A built transaction waiting for the rest of its signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: PendingId,
    /// Human-readable summary shown to the remaining signers.
    pub description: String,
    /// Hex-encoded transaction bytes.
    pub transaction: String,
    /// Hex public keys that must eventually sign.
    pub key_list: Vec<String>,
    /// Hex signatures already collected, keyed by the signing public key.
    pub signed_keys: BTreeMap<String, String>,
    /// Signatures required before the record can be submitted.
    pub threshold: u32,
    pub network: String,
    pub created_at: DateTime<Utc>,
}

impl PendingTransaction {
    pub fn new(
        description: impl Into<String>,
        transaction: impl Into<String>,
        key_list: Vec<String>,
        threshold: u32,
        network: impl Into<String>,
    ) -> Self {
        Self {
            id: PendingId::new(),
            description: description.into(),
            transaction: transaction.into(),
            key_list,
            signed_keys: BTreeMap::new(),
            threshold,
            network: network.into(),
            created_at: Utc::now(),
        }
    }

    /// Record a signature from `key`. Unknown keys and re-signs are ignored.
    pub fn sign(&mut self, key: &str, signature: impl Into<String>) {
        if self.key_list.iter().any(|k| k == key) && !self.signed_keys.contains_key(key) {
            self.signed_keys.insert(key.to_string(), signature.into());
        }
    }

    /// Whether enough keys have signed for out-of-band submission.
    pub fn is_ready(&self) -> bool {
        self.signed_keys.len() as u32 >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_tracks_known_keys_once() {
        let mut record = PendingTransaction::new(
            "burn 5",
            "00ff",
            vec!["aa".into(), "bb".into()],
            2,
            "testnet",
        );
        record.sign("aa", "s1");
        record.sign("aa", "s2");
        record.sign("zz", "s3");
        assert_eq!(record.signed_keys.len(), 1);
        assert_eq!(record.signed_keys.get("aa").map(String::as_str), Some("s1"));
        assert!(!record.is_ready());

        record.sign("bb", "s4");
        assert!(record.is_ready());
    }
}

//! Native token-service backend.
//!
//! Holds the operator's Ed25519 key directly. Transactions are serialized to
//! the ledger-native binary form, signed locally, and submitted synchronously
//! to a consensus node; the error surface is the node's status codes.

use super::{
    BuiltTransaction, InitData, Network, OperationCall, TransactionAdapter, TransactionBody,
    TransactionOutcome, build_action,
};
use crate::{Error, Result};
use async_trait::async_trait;
use capability::{AccountId, Operation};
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};

/// Status a consensus node reports for an accepted transaction.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// A signed ledger transaction ready for a consensus node.
#[derive(Debug, Clone, Serialize)]
pub struct SignedTransaction {
    /// Hex-encoded binary transaction body.
    pub body: String,
    /// Hex-encoded Ed25519 signature over the body bytes.
    pub signature: String,
    /// Hex-encoded public key of the signer.
    pub public_key: String,
}

/// A consensus node's receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerReceipt {
    /// Ledger status code, e.g. `SUCCESS` or `INSUFFICIENT_TOKEN_BALANCE`.
    pub status: String,
    pub transaction_id: String,
}

/// The consensus-node client seam. The ledger's own client library sits
/// behind this; it is consumed, not reimplemented.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn submit(&self, tx: &SignedTransaction) -> Result<LedgerReceipt>;
}

/// HTTP implementation of [`LedgerClient`].
pub struct HttpLedgerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpLedgerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit(&self, tx: &SignedTransaction) -> Result<LedgerReceipt> {
        let url = format!("{}/transactions", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(tx)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

/// Backend that signs and submits ledger-native transactions itself.
pub struct NativeAdapter {
    client: std::sync::Arc<dyn LedgerClient>,
    operator: AccountId,
    network: Network,
    key: SigningKey,
}

impl NativeAdapter {
    pub fn new(
        client: std::sync::Arc<dyn LedgerClient>,
        operator: AccountId,
        network: Network,
        key: SigningKey,
    ) -> Self {
        Self {
            client,
            operator,
            network,
            key,
        }
    }

    fn sign(&self, body: &TransactionBody) -> Result<SignedTransaction> {
        let bytes = body.to_bytes()?;
        let signature = self.key.sign(&bytes);
        Ok(SignedTransaction {
            body: hex::encode(bytes),
            signature: hex::encode(signature.to_bytes()),
            public_key: hex::encode(self.key.verifying_key().to_bytes()),
        })
    }
}

#[async_trait]
impl TransactionAdapter for NativeAdapter {
    async fn register(&self) -> Result<InitData> {
        tracing::info!(operator = %self.operator, network = %self.network, "native backend registered");
        Ok(InitData {
            account: self.operator,
            network: self.network,
        })
    }

    async fn stop(&self) -> Result<()> {
        tracing::debug!("native backend stopped");
        Ok(())
    }

    fn account(&self) -> AccountId {
        self.operator
    }

    fn network(&self) -> Network {
        self.network
    }

    fn build(&self, operation: Operation, call: &OperationCall) -> Result<BuiltTransaction> {
        // Contract-path operations ride inside a native contract-execute
        // body here; the operator key signs either way.
        let action = build_action(operation, call)?;
        Ok(BuiltTransaction::Native(TransactionBody::new(
            self.operator,
            self.network,
            action,
        )))
    }

    async fn sign_and_send(&self, tx: BuiltTransaction) -> Result<TransactionOutcome> {
        let BuiltTransaction::Native(body) = tx else {
            return Err(Error::UnsupportedTransaction);
        };

        let signed = self.sign(&body)?;
        let receipt = self.client.submit(&signed).await?;
        tracing::debug!(status = %receipt.status, id = %receipt.transaction_id, "node answered");

        if receipt.status == STATUS_SUCCESS {
            Ok(TransactionOutcome::success(receipt.transaction_id.clone())
                .with_receipt(serde_json::json!({ "status": receipt.status })))
        } else {
            Ok(TransactionOutcome::failure(receipt.status))
        }
    }
}

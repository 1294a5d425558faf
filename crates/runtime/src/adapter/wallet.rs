//! Wallet-relay backend.
//!
//! Holds no key. The unsigned transaction is serialized, sealed with the
//! pairing topic's key, and published on the relay; the paired wallet signs
//! and submits on its side, then answers with a correlated response. The
//! wait is open-ended — a human is approving — so deadlines belong to the
//! caller.

use super::{
    BuiltTransaction, InitData, Network, OperationCall, TransactionAdapter, TransactionBody,
    TransactionOutcome, build_action,
};
use crate::{Error, Result};
use async_trait::async_trait;
use capability::{AccountId, Operation};
use relay::{Envelope, MessageKind, RelayTransport, TopicCipher, TransactionPayload,
    TransactionResponsePayload};
use std::sync::Arc;
use uuid::Uuid;

/// Backend that relays unsigned transactions to a paired wallet.
pub struct RelayAdapter {
    transport: Arc<dyn RelayTransport>,
    cipher: TopicCipher,
    topic: String,
    /// Account of the paired wallet, learned at pairing time.
    account: AccountId,
    network: Network,
}

impl RelayAdapter {
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        cipher: TopicCipher,
        topic: impl Into<String>,
        account: AccountId,
        network: Network,
    ) -> Self {
        Self {
            transport,
            cipher,
            topic: topic.into(),
            account,
            network,
        }
    }

    fn outcome_from(response: TransactionResponsePayload) -> TransactionOutcome {
        if response.success {
            let mut outcome = TransactionOutcome::success(response.id.to_string());
            if let Some(receipt) = response.receipt {
                outcome = outcome.with_receipt(receipt);
            }
            outcome
        } else {
            TransactionOutcome::failure(
                response
                    .error
                    .unwrap_or_else(|| "rejected by wallet".to_string()),
            )
        }
    }
}

#[async_trait]
impl TransactionAdapter for RelayAdapter {
    async fn register(&self) -> Result<InitData> {
        // Pairing already happened; registering only announces us on the
        // topic so the wallet can show a connected state.
        let ack = Envelope::new(MessageKind::Acknowledge, String::new(), &self.topic);
        self.transport.publish(ack).await?;
        tracing::info!(topic = %self.topic, account = %self.account, "relay backend registered");
        Ok(InitData {
            account: self.account,
            network: self.network,
        })
    }

    async fn stop(&self) -> Result<()> {
        tracing::debug!(topic = %self.topic, "relay backend stopped");
        Ok(())
    }

    fn account(&self) -> AccountId {
        self.account
    }

    fn network(&self) -> Network {
        self.network
    }

    fn build(&self, operation: Operation, call: &OperationCall) -> Result<BuiltTransaction> {
        let action = build_action(operation, call)?;
        Ok(BuiltTransaction::Unsigned(TransactionBody::new(
            self.account,
            self.network,
            action,
        )))
    }

    async fn sign_and_send(&self, tx: BuiltTransaction) -> Result<TransactionOutcome> {
        let BuiltTransaction::Unsigned(body) = tx else {
            return Err(Error::UnsupportedTransaction);
        };

        let payload = TransactionPayload {
            id: Uuid::new_v4(),
            transaction: hex::encode(body.to_bytes()?),
            network: self.network.to_string(),
        };
        let sealed = self.cipher.seal(&serde_json::to_vec(&payload)?)?;

        // Subscribe before publishing so the response cannot slip past us.
        let mut subscription = self.transport.subscribe(&self.topic).await?;
        let envelope = Envelope::new(MessageKind::Transaction, sealed, &self.topic);
        self.transport.publish(envelope).await?;
        tracing::debug!(id = %payload.id, topic = %self.topic, "awaiting wallet response");

        // Open-ended wait; the caller imposes any deadline.
        loop {
            let envelope = subscription.recv().await?;
            if envelope.kind != MessageKind::TransactionResponse {
                continue;
            }
            let clear = match self.cipher.open(&envelope.data) {
                Ok(clear) => clear,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable envelope");
                    continue;
                }
            };
            let response: TransactionResponsePayload = match serde_json::from_slice(&clear) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed response");
                    continue;
                }
            };
            if response.id != payload.id {
                continue;
            }
            return Ok(Self::outcome_from(response));
        }
    }
}

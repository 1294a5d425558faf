//! Multi-signature backend.
//!
//! Never submits to the ledger. Submission here means recording the unsigned
//! transaction in the pending store, optionally attaching our own signature,
//! and handing back a deferred outcome carrying the record id. Other key
//! holders collect and sign out of band until the threshold is met.

use super::{
    BuiltTransaction, InitData, Network, OperationCall, TransactionAdapter, TransactionBody,
    TransactionOutcome, build_action,
};
use crate::{Error, Result};
use async_trait::async_trait;
use capability::{AccountId, Operation};
use ed25519_dalek::{Signer, SigningKey};
use store::{PendingStore, PendingTransaction};
use tokio::sync::Mutex;

/// Backend that parks transactions in a pending store for threshold signing.
pub struct MultisigAdapter {
    // rusqlite connections are not Sync; serialize access behind a lock.
    store: Mutex<PendingStore>,
    account: AccountId,
    network: Network,
    /// Our own key, when this instance is itself one of the signers.
    key: Option<SigningKey>,
    key_list: Vec<String>,
    threshold: u32,
}

impl MultisigAdapter {
    pub fn new(
        store: PendingStore,
        account: AccountId,
        network: Network,
        key: Option<SigningKey>,
        key_list: Vec<String>,
        threshold: u32,
    ) -> Result<Self> {
        if threshold == 0 || threshold as usize > key_list.len() {
            return Err(Error::Config(format!(
                "threshold {} outside key list of {}",
                threshold,
                key_list.len()
            )));
        }
        Ok(Self {
            store: Mutex::new(store),
            account,
            network,
            key,
            key_list,
            threshold,
        })
    }
}

#[async_trait]
impl TransactionAdapter for MultisigAdapter {
    async fn register(&self) -> Result<InitData> {
        tracing::info!(
            account = %self.account,
            signers = self.key_list.len(),
            threshold = self.threshold,
            "multisig backend registered"
        );
        Ok(InitData {
            account: self.account,
            network: self.network,
        })
    }

    async fn stop(&self) -> Result<()> {
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

        let bytes = body.to_bytes()?;
        let mut record = PendingTransaction::new(
            body.describe(),
            hex::encode(&bytes),
            self.key_list.clone(),
            self.threshold,
            self.network.to_string(),
        );
        if let Some(key) = &self.key {
            let public = hex::encode(key.verifying_key().to_bytes());
            let signature = hex::encode(key.sign(&bytes).to_bytes());
            record.sign(&public, signature);
        }

        let store = self.store.lock().await;
        store.create(&record)?;
        tracing::info!(id = %record.id, signed = record.signed_keys.len(), "transaction parked for signatures");
        Ok(TransactionOutcome::deferred(record.id.to_string()))
    }
}

//! Active-backend registration and submission.
//!
//! A process has at most one active backend at a time. Connecting while one
//! is active is a reconnect: the old registration is stopped before the new
//! one registers, so two backends never overlap.

use crate::adapter::{InitData, OperationCall, TransactionAdapter, TransactionOutcome};
use crate::reader::CapabilityReader;
use crate::{Error, Result};
use capability::{AccountId, Amount, CoinCapabilities, Operation, TokenId};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Registration {
    adapter: Box<dyn TransactionAdapter>,
    init: InitData,
}

/// The process's single execution session: one active backend plus the
/// capability read side.
pub struct NetworkSession {
    active: RwLock<Option<Registration>>,
    reader: Arc<dyn CapabilityReader>,
}

impl NetworkSession {
    pub fn new(reader: Arc<dyn CapabilityReader>) -> Self {
        Self {
            active: RwLock::new(None),
            reader,
        }
    }

    /// Make `adapter` the active backend. Any previous registration is
    /// stopped first.
    pub async fn connect(&self, adapter: Box<dyn TransactionAdapter>) -> Result<InitData> {
        let mut active = self.active.write().await;
        if let Some(old) = active.take() {
            old.adapter.stop().await?;
            tracing::info!(account = %old.init.account, "previous backend stopped");
        }
        let init = adapter.register().await?;
        tracing::info!(account = %init.account, network = %init.network, "backend registered");
        *active = Some(Registration {
            adapter,
            init: init.clone(),
        });
        Ok(init)
    }

    /// Stop and drop the active backend, if any.
    pub async fn disconnect(&self) -> Result<()> {
        let mut active = self.active.write().await;
        if let Some(old) = active.take() {
            old.adapter.stop().await?;
        }
        Ok(())
    }

    /// The active registration's identity.
    pub async fn init(&self) -> Result<InitData> {
        let active = self.active.read().await;
        match active.as_ref() {
            Some(registration) => Ok(registration.init.clone()),
            None => Err(Error::InvalidState("no active backend".to_string())),
        }
    }

    /// Submit `operation` through the active backend.
    pub async fn submit(
        &self,
        operation: Operation,
        call: &OperationCall,
    ) -> Result<TransactionOutcome> {
        let active = self.active.read().await;
        let adapter = match active.as_ref() {
            Some(registration) => registration.adapter.as_ref(),
            None => return Err(Error::InvalidState("no active backend".to_string())),
        };
        match operation {
            Operation::CashIn => adapter.cash_in(call).await,
            Operation::Burn => adapter.burn(call).await,
            Operation::Wipe => adapter.wipe(call).await,
            Operation::Freeze => adapter.freeze(call).await,
            Operation::Unfreeze => adapter.unfreeze(call).await,
            Operation::Pause => adapter.pause(call).await,
            Operation::Unpause => adapter.unpause(call).await,
            Operation::Delete => adapter.delete(call).await,
            Operation::Rescue => adapter.rescue(call).await,
            Operation::GrantRole => adapter.grant_role(call).await,
            Operation::RevokeRole => adapter.revoke_role(call).await,
        }
    }

    /// Fresh capability read for the active account.
    pub async fn capabilities_of(&self, token: TokenId) -> Result<CoinCapabilities> {
        let account = self.init().await?.account;
        self.reader.capabilities_of(token, account).await
    }

    /// Capability read for an arbitrary account.
    pub async fn capabilities_for(
        &self,
        token: TokenId,
        account: AccountId,
    ) -> Result<CoinCapabilities> {
        self.reader.capabilities_of(token, account).await
    }

    pub async fn treasury_balance_of(&self, token: TokenId) -> Result<Amount> {
        self.reader.treasury_balance_of(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{BuiltTransaction, Network};
    use crate::reader::StaticCapabilityReader;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingAdapter {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TransactionAdapter for RecordingAdapter {
        async fn register(&self) -> Result<InitData> {
            self.events
                .lock()
                .unwrap()
                .push(format!("register {}", self.name));
            Ok(InitData {
                account: "0.0.500".parse().unwrap(),
                network: Network::Testnet,
            })
        }

        async fn stop(&self) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("stop {}", self.name));
            Ok(())
        }

        fn account(&self) -> AccountId {
            "0.0.500".parse().unwrap()
        }

        fn network(&self) -> Network {
            Network::Testnet
        }

        fn build(&self, _: Operation, _: &OperationCall) -> Result<BuiltTransaction> {
            Err(Error::UnsupportedTransaction)
        }

        async fn sign_and_send(&self, _: BuiltTransaction) -> Result<TransactionOutcome> {
            Err(Error::UnsupportedTransaction)
        }
    }

    fn session() -> NetworkSession {
        NetworkSession::new(Arc::new(StaticCapabilityReader::new()))
    }

    #[tokio::test]
    async fn reconnect_stops_old_before_registering_new() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let session = session();

        for name in ["first", "second"] {
            session
                .connect(Box::new(RecordingAdapter {
                    name,
                    events: events.clone(),
                }))
                .await
                .unwrap();
        }
        session.disconnect().await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "register first",
                "stop first",
                "register second",
                "stop second"
            ]
        );
    }

    #[tokio::test]
    async fn submit_without_backend_is_invalid_state() {
        let session = session();
        let call = OperationCall {
            token: "0.0.100".parse().unwrap(),
            contract: None,
            target: None,
            amount: None,
            role: None,
            access: capability::AccessKind::Native,
        };
        assert!(matches!(
            session.submit(Operation::Pause, &call).await,
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(session.init().await, Err(Error::InvalidState(_))));
    }
}

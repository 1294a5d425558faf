//! Capability reads.
//!
//! Decisions are made against a fresh capability read, never a cached one.
//! [`CapabilityReader`] is the seam; the HTTP implementation talks to the
//! mirror's REST surface, the static one backs tests and offline tooling.

use crate::{Error, Result};
use async_trait::async_trait;
use capability::{
    AccessKind, AccountId, Amount, Capability, Coin, CoinCapabilities, ContractId, Operation,
    TokenId,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Read-side view of the ledger: what an account may do with a coin, and
/// what the treasury currently holds.
#[async_trait]
pub trait CapabilityReader: Send + Sync {
    /// The capabilities `account` holds over `token`, read fresh.
    async fn capabilities_of(&self, token: TokenId, account: AccountId)
    -> Result<CoinCapabilities>;

    /// The coin's treasury balance, at the coin's own scale.
    async fn treasury_balance_of(&self, token: TokenId) -> Result<Amount>;
}

/// Wire shape of one granted capability.
#[derive(Debug, Deserialize)]
struct CapabilityView {
    operation: Operation,
    access: AccessKind,
}

/// Wire shape of a capability read.
#[derive(Debug, Deserialize)]
struct CapabilitiesView {
    token: TokenId,
    contract: Option<ContractId>,
    decimals: u8,
    capabilities: Vec<CapabilityView>,
}

/// Wire shape of a treasury balance read.
#[derive(Debug, Deserialize)]
struct BalanceView {
    amount: String,
    decimals: u8,
}

/// Mirror-backed capability reader.
pub struct HttpCapabilityReader {
    http: reqwest::Client,
    base: String,
}

impl HttpCapabilityReader {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("{status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

#[async_trait]
impl CapabilityReader for HttpCapabilityReader {
    async fn capabilities_of(
        &self,
        token: TokenId,
        account: AccountId,
    ) -> Result<CoinCapabilities> {
        let view: CapabilitiesView = self
            .fetch(&format!("/tokens/{token}/capabilities/{account}"))
            .await?;
        let coin = Coin {
            token: view.token,
            contract: view.contract,
            decimals: view.decimals,
        };
        let capabilities = view
            .capabilities
            .into_iter()
            .map(|c| Capability {
                operation: c.operation,
                access: c.access,
            })
            .collect();
        Ok(CoinCapabilities::new(coin, account, capabilities)?)
    }

    async fn treasury_balance_of(&self, token: TokenId) -> Result<Amount> {
        let view: BalanceView = self.fetch(&format!("/tokens/{token}/balance")).await?;
        Ok(Amount::parse(&view.amount, view.decimals)?)
    }
}

/// Fixed capability reader for tests and offline tooling.
#[derive(Default)]
pub struct StaticCapabilityReader {
    capabilities: HashMap<(TokenId, AccountId), CoinCapabilities>,
    balances: HashMap<TokenId, Amount>,
}

impl StaticCapabilityReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capabilities(mut self, capabilities: CoinCapabilities) -> Self {
        self.capabilities.insert(
            (capabilities.coin.token, capabilities.account),
            capabilities,
        );
        self
    }

    pub fn with_balance(mut self, token: TokenId, balance: Amount) -> Self {
        self.balances.insert(token, balance);
        self
    }
}

#[async_trait]
impl CapabilityReader for StaticCapabilityReader {
    async fn capabilities_of(
        &self,
        token: TokenId,
        account: AccountId,
    ) -> Result<CoinCapabilities> {
        self.capabilities
            .get(&(token, account))
            .cloned()
            .ok_or_else(|| Error::InvalidState(format!("no capability entry for {token}/{account}")))
    }

    async fn treasury_balance_of(&self, token: TokenId) -> Result<Amount> {
        self.balances
            .get(&token)
            .copied()
            .ok_or_else(|| Error::InvalidState(format!("no balance entry for {token}")))
    }
}

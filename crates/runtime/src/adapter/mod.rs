//! Transaction-execution backends.
//!
//! One [`TransactionAdapter`] contract, four structurally different
//! implementations:
//!
//! - [`NativeAdapter`] holds the operator key and submits ledger-native
//!   signed transactions straight to a consensus node.
//! - [`ContractAdapter`] ABI-encodes contract calls and submits them over
//!   JSON-RPC to an EVM relay; it never holds a key.
//! - [`RelayAdapter`] ships unsigned transactions to a paired wallet over an
//!   encrypted relay topic and waits for the human on the other side.
//! - [`MultisigAdapter`] parks built transactions in a record store for the
//!   remaining signers; nothing is submitted at call time.
//!
//! Every backend's per-operation methods return the same
//! [`TransactionOutcome`] shape, so handler code stays backend-agnostic.

mod contract;
mod multisig;
mod native;
mod rpc;
mod wallet;

pub use contract::ContractAdapter;
pub use multisig::MultisigAdapter;
pub use native::{HttpLedgerClient, LedgerClient, LedgerReceipt, NativeAdapter, SignedTransaction};
pub use rpc::{JsonRpcError, RpcClient};
pub use wallet::RelayAdapter;

use crate::abi::{self, AbiValue};
use crate::{Error, Result};
use async_trait::async_trait;
use capability::{AccessKind, AccountId, Amount, ContractId, Operation, Role, TokenId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ledger a backend talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Mainnet,
    Testnet,
    Previewnet,
    Local,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            "local" => Ok(Self::Local),
            other => Err(Error::Config(format!("unknown network: {other}"))),
        }
    }
}

/// Which backend a wallet selection maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Native,
    Contract,
    Relay,
    Multisig,
}

/// What a backend reports when it becomes the active registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    pub account: AccountId,
    pub network: Network,
}

/// Normalized result of a submission, one shape for every backend.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Ledger transaction id, contract transaction hash, or pending-record
    /// id, depending on the backend.
    pub id: Option<String>,
    /// Backend receipt detail; shape varies by backend.
    pub receipt: Option<serde_json::Value>,
    /// Present when the backend reported a failure.
    pub error: Option<String>,
}

impl TransactionOutcome {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            receipt: None,
            error: None,
        }
    }

    /// A multi-sig submission: the id names the stored record, real
    /// submission happens later, out of band.
    pub fn deferred(id: impl Into<String>) -> Self {
        Self::success(id)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            receipt: None,
            error: Some(message.into()),
        }
    }

    pub fn with_receipt(mut self, receipt: serde_json::Value) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything a backend needs to build one operation's payload, with the
/// access path already decided.
#[derive(Debug, Clone)]
pub struct OperationCall {
    pub token: TokenId,
    /// The coin's proxy contract, when one is deployed.
    pub contract: Option<ContractId>,
    pub target: Option<AccountId>,
    pub amount: Option<Amount>,
    pub role: Option<Role>,
    pub access: AccessKind,
}

/// Serialized, signable transaction content shared by the backends that ship
/// whole transactions (native, wallet-relay, multi-sig).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBody {
    pub operator: AccountId,
    pub network: Network,
    pub valid_start: DateTime<Utc>,
    pub action: BodyAction,
}

impl TransactionBody {
    pub fn new(operator: AccountId, network: Network, action: BodyAction) -> Self {
        Self {
            operator,
            network,
            valid_start: Utc::now(),
            action,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Encode(e.to_string()))
    }

    /// Short human-readable summary, used for pending-record descriptions.
    pub fn describe(&self) -> String {
        match &self.action {
            BodyAction::Token {
                operation, token, ..
            } => format!("{operation} {token}"),
            BodyAction::ContractExecute { contract, .. } => format!("call {contract}"),
        }
    }
}

/// What a transaction body does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyAction {
    /// Native token-service operation.
    Token {
        operation: Operation,
        token: TokenId,
        target: Option<AccountId>,
        amount: Option<Amount>,
        role: Option<Role>,
    },
    /// Contract execution wrapped in a ledger transaction.
    ContractExecute {
        contract: ContractId,
        data: Vec<u8>,
        gas: u64,
    },
}

/// An ABI-encoded call submitted through the JSON-RPC relay.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub contract: ContractId,
    /// Canonical signature, kept for logging.
    pub function: &'static str,
    pub data: Vec<u8>,
    pub gas: u64,
}

/// A built transaction, ready for [`TransactionAdapter::sign_and_send`].
/// Tagged per submission shape; each backend accepts the variants it can
/// carry.
#[derive(Debug, Clone)]
pub enum BuiltTransaction {
    /// Ledger-native binary transaction (signed by the backend).
    Native(TransactionBody),
    /// ABI-encoded contract call for the JSON-RPC relay.
    ContractCall(ContractCall),
    /// Unsigned transaction for the wallet-relay and multi-sig channels.
    Unsigned(TransactionBody),
}

/// The common execution contract.
///
/// Exactly one adapter registration is active per process at a time; the
/// session owns that registration. Adapters are reentrant: no per-call
/// mutable state, so concurrent submissions through the same adapter are
/// safe. No retry lives here — ledger transactions are single-use, so a
/// retry means re-deciding and rebuilding upstream.
#[async_trait]
pub trait TransactionAdapter: Send + Sync {
    /// Become the process's active backend.
    async fn register(&self) -> Result<InitData>;

    /// Release network resources and deregister. Idempotent.
    async fn stop(&self) -> Result<()>;

    /// The identity this adapter currently operates as.
    fn account(&self) -> AccountId;

    fn network(&self) -> Network;

    /// Build the backend-appropriate payload for an operation.
    fn build(&self, operation: Operation, call: &OperationCall) -> Result<BuiltTransaction>;

    /// Submit a built transaction through this backend's channel.
    async fn sign_and_send(&self, tx: BuiltTransaction) -> Result<TransactionOutcome>;

    /// Build and submit in one step.
    async fn submit(&self, operation: Operation, call: &OperationCall) -> Result<TransactionOutcome> {
        let tx = self.build(operation, call)?;
        self.sign_and_send(tx).await
    }

    async fn cash_in(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::CashIn, call).await
    }

    async fn burn(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Burn, call).await
    }

    async fn wipe(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Wipe, call).await
    }

    async fn freeze(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Freeze, call).await
    }

    async fn unfreeze(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Unfreeze, call).await
    }

    async fn pause(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Pause, call).await
    }

    async fn unpause(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Unpause, call).await
    }

    async fn delete(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Delete, call).await
    }

    async fn rescue(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::Rescue, call).await
    }

    async fn grant_role(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::GrantRole, call).await
    }

    async fn revoke_role(&self, call: &OperationCall) -> Result<TransactionOutcome> {
        self.submit(Operation::RevokeRole, call).await
    }
}

/// Build the body action for an operation on the decided access path.
/// Shared by every backend that ships whole transaction bodies.
pub(crate) fn build_action(operation: Operation, call: &OperationCall) -> Result<BodyAction> {
    match call.access {
        AccessKind::Native => Ok(BodyAction::Token {
            operation,
            token: call.token,
            target: call.target,
            amount: call.amount,
            role: call.role,
        }),
        AccessKind::Contract => {
            let (contract, _, data) = encode_contract_call(operation, call)?;
            Ok(BodyAction::ContractExecute {
                contract,
                data,
                gas: gas_for(operation),
            })
        }
    }
}

/// ABI-encode one operation against the coin's proxy contract.
pub(crate) fn encode_contract_call(
    operation: Operation,
    call: &OperationCall,
) -> Result<(ContractId, &'static str, Vec<u8>)> {
    let contract = call
        .contract
        .ok_or_else(|| Error::InvalidState(format!("{} has no contract deployed", call.token)))?;

    let target = || {
        call.target
            .map(|t| AbiValue::Address(t.to_evm_address()))
            .ok_or_else(|| Error::InvalidState(format!("{operation} requires a target account")))
    };
    let amount = || {
        call.amount
            .map(|a| AbiValue::Uint(a.raw()))
            .ok_or_else(|| Error::InvalidState(format!("{operation} requires an amount")))
    };
    let role = || {
        call.role
            .map(|r| AbiValue::Bytes32(abi::role_id(r)))
            .ok_or_else(|| Error::InvalidState(format!("{operation} requires a role")))
    };

    let (function, args): (&'static str, Vec<AbiValue>) = match operation {
        Operation::CashIn => ("mint(address,uint256)", vec![target()?, amount()?]),
        Operation::Burn => ("burn(uint256)", vec![amount()?]),
        Operation::Wipe => ("wipe(address,uint256)", vec![target()?, amount()?]),
        Operation::Freeze => ("freeze(address)", vec![target()?]),
        Operation::Unfreeze => ("unfreeze(address)", vec![target()?]),
        Operation::Pause => ("pause()", vec![]),
        Operation::Unpause => ("unpause()", vec![]),
        Operation::Delete => ("deleteToken()", vec![]),
        Operation::Rescue => ("rescue(uint256)", vec![amount()?]),
        Operation::GrantRole => ("grantRole(bytes32,address)", vec![role()?, target()?]),
        Operation::RevokeRole => ("revokeRole(bytes32,address)", vec![role()?, target()?]),
    };

    Ok((contract, function, abi::encode_call(function, &args)))
}

/// Gas ceilings per operation for the contract path.
pub(crate) fn gas_for(operation: Operation) -> u64 {
    match operation {
        Operation::CashIn => 120_000,
        Operation::Burn => 70_000,
        Operation::Wipe => 70_000,
        Operation::Freeze | Operation::Unfreeze => 65_000,
        Operation::Pause | Operation::Unpause => 65_000,
        Operation::Delete => 90_000,
        Operation::Rescue => 70_000,
        Operation::GrantRole | Operation::RevokeRole => 85_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(access: AccessKind) -> OperationCall {
        OperationCall {
            token: "0.0.100".parse().unwrap(),
            contract: Some("0.0.200".parse().unwrap()),
            target: Some("0.0.300".parse().unwrap()),
            amount: Some(Amount::parse("10.00", 2).unwrap()),
            role: Some(Role::CashIn),
            access,
        }
    }

    #[test]
    fn native_access_builds_token_action() {
        let action = build_action(Operation::Burn, &call(AccessKind::Native)).unwrap();
        match action {
            BodyAction::Token {
                operation, token, ..
            } => {
                assert_eq!(operation, Operation::Burn);
                assert_eq!(token.to_string(), "0.0.100");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn contract_access_builds_encoded_call() {
        let action = build_action(Operation::CashIn, &call(AccessKind::Contract)).unwrap();
        match action {
            BodyAction::ContractExecute { contract, data, gas } => {
                assert_eq!(contract.to_string(), "0.0.200");
                assert_eq!(&data[..4], &crate::abi::selector("mint(address,uint256)"));
                assert_eq!(gas, gas_for(Operation::CashIn));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn contract_access_without_contract_fails() {
        let mut c = call(AccessKind::Contract);
        c.contract = None;
        assert!(build_action(Operation::Pause, &c).is_err());
    }

    #[test]
    fn missing_argument_is_reported() {
        let mut c = call(AccessKind::Contract);
        c.target = None;
        let err = encode_contract_call(Operation::Wipe, &c).unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn body_serializes_and_describes() {
        let body = TransactionBody::new(
            "0.0.1".parse().unwrap(),
            Network::Testnet,
            build_action(Operation::Pause, &call(AccessKind::Native)).unwrap(),
        );
        assert!(!body.to_bytes().unwrap().is_empty());
        assert_eq!(body.describe(), "pause 0.0.100");
    }
}

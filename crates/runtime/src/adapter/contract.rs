//! Contract-call backend over JSON-RPC.
//!
//! Holds no key. Operations are ABI-encoded against the coin's proxy
//! contract and handed to an EVM-compatible relay with
//! `eth_sendTransaction`; the relay's wallet signs. The error surface is
//! contract revert reasons, decoded from the relay's structured errors.

use super::{
    BuiltTransaction, ContractCall, InitData, Network, OperationCall, RpcClient,
    TransactionAdapter, TransactionOutcome, encode_contract_call, gas_for,
};
use crate::abi;
use crate::{Error, Result};
use async_trait::async_trait;
use capability::{AccessKind, AccountId, Operation};
use serde_json::json;

/// Backend that submits ABI-encoded calls through a JSON-RPC relay.
pub struct ContractAdapter {
    rpc: RpcClient,
    account: AccountId,
    network: Network,
}

impl ContractAdapter {
    pub fn new(rpc: RpcClient, account: AccountId, network: Network) -> Self {
        Self {
            rpc,
            account,
            network,
        }
    }

    fn hex_address(account: AccountId) -> String {
        format!("0x{}", hex::encode(account.to_evm_address()))
    }
}

#[async_trait]
impl TransactionAdapter for ContractAdapter {
    async fn register(&self) -> Result<InitData> {
        // Probe the relay so a dead endpoint fails at connect time, not on
        // the first operation.
        let chain_id = self
            .rpc
            .call("eth_chainId", serde_json::Value::Null)
            .await?
            .map_err(|e| Error::Rpc(e.to_string()))?;
        tracing::info!(
            account = %self.account,
            network = %self.network,
            ?chain_id,
            "contract backend registered"
        );
        Ok(InitData {
            account: self.account,
            network: self.network,
        })
    }

    async fn stop(&self) -> Result<()> {
        tracing::debug!("contract backend stopped");
        Ok(())
    }

    fn account(&self) -> AccountId {
        self.account
    }

    fn network(&self) -> Network {
        self.network
    }

    fn build(&self, operation: Operation, call: &OperationCall) -> Result<BuiltTransaction> {
        if call.access != AccessKind::Contract {
            return Err(Error::UnsupportedAccess {
                operation,
                access: call.access,
            });
        }
        let (contract, function, data) = encode_contract_call(operation, call)?;
        Ok(BuiltTransaction::ContractCall(ContractCall {
            contract,
            function,
            data,
            gas: gas_for(operation),
        }))
    }

    async fn sign_and_send(&self, tx: BuiltTransaction) -> Result<TransactionOutcome> {
        let BuiltTransaction::ContractCall(call) = tx else {
            return Err(Error::UnsupportedTransaction);
        };

        tracing::debug!(function = call.function, contract = %call.contract, "sending contract call");
        let params = json!([{
            "from": Self::hex_address(self.account),
            "to": format!("0x{}", hex::encode(call.contract.to_evm_address())),
            "data": format!("0x{}", hex::encode(&call.data)),
            "gas": format!("0x{:x}", call.gas),
        }]);

        match self.rpc.call("eth_sendTransaction", params).await? {
            Ok(result) => {
                let hash = result.as_str().unwrap_or_default().to_string();
                Ok(TransactionOutcome::success(hash)
                    .with_receipt(json!({ "function": call.function })))
            }
            Err(rpc_err) => {
                // A revert reason travels in the error data; everything else
                // is surfaced as the relay's own message.
                let reason = rpc_err
                    .data
                    .as_ref()
                    .and_then(|d| d.as_str())
                    .and_then(|d| abi::decode_revert_hex(d).ok().flatten());
                Ok(TransactionOutcome::failure(match reason {
                    Some(reason) => reason,
                    None => rpc_err.to_string(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::Amount;

    fn adapter() -> ContractAdapter {
        ContractAdapter::new(
            RpcClient::new("http://localhost:7546"),
            "0.0.2".parse().unwrap(),
            Network::Local,
        )
    }

    fn call(access: AccessKind) -> OperationCall {
        OperationCall {
            token: "0.0.100".parse().unwrap(),
            contract: Some("0.0.200".parse().unwrap()),
            target: Some("0.0.300".parse().unwrap()),
            amount: Some(Amount::parse("1.00", 2).unwrap()),
            role: None,
            access,
        }
    }

    #[test]
    fn refuses_native_access_path() {
        let err = adapter()
            .build(Operation::Burn, &call(AccessKind::Native))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAccess { .. }));
    }

    #[test]
    fn builds_encoded_contract_call() {
        let tx = adapter()
            .build(Operation::Wipe, &call(AccessKind::Contract))
            .unwrap();
        match tx {
            BuiltTransaction::ContractCall(c) => {
                assert_eq!(c.function, "wipe(address,uint256)");
                assert_eq!(&c.data[..4], &abi::selector("wipe(address,uint256)"));
            }
            other => panic!("unexpected tx: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_foreign_transaction_shapes() {
        let body = super::super::TransactionBody::new(
            "0.0.2".parse().unwrap(),
            Network::Local,
            super::super::BodyAction::Token {
                operation: Operation::Pause,
                token: "0.0.100".parse().unwrap(),
                target: None,
                amount: None,
                role: None,
            },
        );
        assert!(matches!(
            adapter()
                .sign_and_send(BuiltTransaction::Native(body))
                .await,
            Err(Error::UnsupportedTransaction)
        ));
    }
}

//! Operations, granted capabilities, and the routing decision.

use crate::{AccountId, ContractId, Error, Result, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of stablecoin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CashIn,
    Burn,
    Wipe,
    Freeze,
    Unfreeze,
    Pause,
    Unpause,
    Delete,
    Rescue,
    GrantRole,
    RevokeRole,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CashIn => "cash_in",
            Self::Burn => "burn",
            Self::Wipe => "wipe",
            Self::Freeze => "freeze",
            Self::Unfreeze => "unfreeze",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::Delete => "delete",
            Self::Rescue => "rescue",
            Self::GrantRole => "grant_role",
            Self::RevokeRole => "revoke_role",
        };
        f.write_str(name)
    }
}

/// How a granted operation executes: through the ledger's native token
/// service or through a smart-contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Native,
    Contract,
}

/// One grant: an operation and the path it runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub operation: Operation,
    pub access: AccessKind,
}

impl Capability {
    pub fn native(operation: Operation) -> Self {
        Self {
            operation,
            access: AccessKind::Native,
        }
    }

    pub fn contract(operation: Operation) -> Self {
        Self {
            operation,
            access: AccessKind::Contract,
        }
    }
}

/// Contract-side roles used by `grant_role`/`revoke_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    CashIn,
    Burn,
    Wipe,
    Freeze,
    Pause,
    Rescue,
    Delete,
    Kyc,
}

impl Role {
    /// The contract's name for this role, hashed into the on-chain role id.
    pub fn contract_name(&self) -> &'static str {
        match self {
            Self::Admin => "DEFAULT_ADMIN_ROLE",
            Self::CashIn => "CASHIN_ROLE",
            Self::Burn => "BURN_ROLE",
            Self::Wipe => "WIPE_ROLE",
            Self::Freeze => "FREEZE_ROLE",
            Self::Pause => "PAUSE_ROLE",
            Self::Rescue => "RESCUE_ROLE",
            Self::Delete => "DELETE_ROLE",
            Self::Kyc => "KYC_ROLE",
        }
    }
}

/// The coin a capability set applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub token: TokenId,
    /// Proxy contract backing the coin, when one is deployed.
    pub contract: Option<ContractId>,
    pub decimals: u8,
}

/// The capabilities a coin grants to an acting account.
///
/// Holds at most one entry per operation; construction rejects duplicates
/// rather than silently letting a later entry win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCapabilities {
    pub coin: Coin,
    pub account: AccountId,
    capabilities: Vec<Capability>,
}

impl CoinCapabilities {
    pub fn new(coin: Coin, account: AccountId, capabilities: Vec<Capability>) -> Result<Self> {
        for (i, cap) in capabilities.iter().enumerate() {
            if capabilities[..i].iter().any(|c| c.operation == cap.operation) {
                return Err(Error::DuplicateOperation(cap.operation));
            }
        }
        Ok(Self {
            coin,
            account,
            capabilities,
        })
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn decide(&self, operation: Operation) -> Decision {
        decide(self, operation)
    }
}

/// Outcome of resolving an operation against a capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Native,
    Contract,
    Forbidden,
}

impl Decision {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// The access path this decision permits, if any.
    pub fn access(&self) -> Option<AccessKind> {
        match self {
            Self::Native => Some(AccessKind::Native),
            Self::Contract => Some(AccessKind::Contract),
            Self::Forbidden => None,
        }
    }
}

/// Resolve an operation against a capability set.
///
/// Exact-match lookup: no wildcards, no partial matches. A missing grant is
/// `Forbidden`, which is a valid decision rather than an error. Pure; never
/// fails.
pub fn decide(capabilities: &CoinCapabilities, operation: Operation) -> Decision {
    match capabilities
        .capabilities
        .iter()
        .find(|c| c.operation == operation)
    {
        Some(cap) => match cap.access {
            AccessKind::Native => Decision::Native,
            AccessKind::Contract => Decision::Contract,
        },
        None => Decision::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin() -> Coin {
        Coin {
            token: "0.0.100".parse().unwrap(),
            contract: Some("0.0.200".parse().unwrap()),
            decimals: 2,
        }
    }

    fn account() -> AccountId {
        "0.0.300".parse().unwrap()
    }

    fn caps(entries: Vec<Capability>) -> CoinCapabilities {
        CoinCapabilities::new(coin(), account(), entries).unwrap()
    }

    #[test]
    fn empty_set_forbids_everything() {
        let caps = caps(vec![]);
        for op in [
            Operation::CashIn,
            Operation::Burn,
            Operation::Wipe,
            Operation::Freeze,
            Operation::Unfreeze,
            Operation::Pause,
            Operation::Unpause,
            Operation::Delete,
            Operation::Rescue,
            Operation::GrantRole,
            Operation::RevokeRole,
        ] {
            assert_eq!(decide(&caps, op), Decision::Forbidden);
        }
    }

    #[test]
    fn grants_map_to_their_access_kind() {
        let caps = caps(vec![
            Capability::contract(Operation::CashIn),
            Capability::native(Operation::Burn),
        ]);
        assert_eq!(decide(&caps, Operation::CashIn), Decision::Contract);
        assert_eq!(decide(&caps, Operation::Burn), Decision::Native);
        assert_eq!(decide(&caps, Operation::Wipe), Decision::Forbidden);
        assert_eq!(decide(&caps, Operation::Freeze), Decision::Forbidden);
    }

    #[test]
    fn decide_is_deterministic() {
        let caps = caps(vec![Capability::native(Operation::Pause)]);
        let first = decide(&caps, Operation::Pause);
        for _ in 0..10 {
            assert_eq!(decide(&caps, Operation::Pause), first);
        }
    }

    #[test]
    fn duplicate_operation_rejected() {
        let entries = vec![
            Capability::native(Operation::Burn),
            Capability::contract(Operation::Burn),
        ];
        let err = CoinCapabilities::new(coin(), account(), entries).unwrap_err();
        assert!(matches!(err, Error::DuplicateOperation(Operation::Burn)));
    }

    #[test]
    fn decision_access_path() {
        assert_eq!(Decision::Native.access(), Some(AccessKind::Native));
        assert_eq!(Decision::Contract.access(), Some(AccessKind::Contract));
        assert_eq!(Decision::Forbidden.access(), None);
        assert!(Decision::Forbidden.is_forbidden());
    }
}

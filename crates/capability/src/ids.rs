//! Ledger entity identifiers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ledger entity id in `shard.realm.num` form (e.g. `0.0.123456`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// The 20-byte EVM alias for this entity: 4 bytes of shard, 8 of realm,
    /// 8 of num, all big-endian.
    pub fn to_evm_address(self) -> [u8; 20] {
        let mut addr = [0u8; 20];
        addr[..4].copy_from_slice(&(self.shard as u32).to_be_bytes());
        addr[4..12].copy_from_slice(&self.realm.to_be_bytes());
        addr[12..].copy_from_slice(&self.num.to_be_bytes());
        addr
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidEntityId(s.to_string());
        let mut parts = s.split('.');
        let shard = parts.next().ok_or_else(invalid)?;
        let realm = parts.next().ok_or_else(invalid)?;
        let num = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            shard: shard.parse().map_err(|_| invalid())?,
            realm: realm.parse().map_err(|_| invalid())?,
            num: num.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for EntityId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

/// Id of a token (a coin instance) on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub EntityId);

/// Id of an account on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub EntityId);

/// Id of a deployed contract on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub EntityId);

impl AccountId {
    pub fn to_evm_address(self) -> [u8; 20] {
        self.0.to_evm_address()
    }
}

impl ContractId {
    pub fn to_evm_address(self) -> [u8; 20] {
        self.0.to_evm_address()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(Self)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(Self)
    }
}

impl FromStr for ContractId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(Self)
    }
}

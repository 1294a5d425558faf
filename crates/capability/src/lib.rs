//! Capability model for stablecoin operations.
//!
//! Core principle: **every state-changing operation must resolve to a
//! permitted execution path before anything touches the network.**
//!
//! A coin grants a set of [`Capability`] entries, at most one per
//! [`Operation`]. [`decide`] maps a granted set and a requested operation to
//! a [`Decision`]: run through the ledger's native token service, run through
//! a smart-contract call, or refuse. The function is pure; absence of a
//! grant is a valid `Forbidden` decision, not an error.

mod amount;
mod capability;
mod error;
mod ids;

pub use amount::{Amount, MAX_DECIMALS};
pub use capability::{
    AccessKind, Capability, Coin, CoinCapabilities, Decision, Operation, Role, decide,
};
pub use error::{Error, Result};
pub use ids::{AccountId, ContractId, EntityId, TokenId};

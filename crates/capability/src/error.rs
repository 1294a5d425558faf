//! Capability error types.

use crate::Operation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An entity id was not in `shard.realm.num` form.
    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    /// An amount string could not be parsed at the coin's precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A capability set carried more than one entry for the same operation.
    #[error("duplicate capability for operation {0}")]
    DuplicateOperation(Operation),
}

pub type Result<T> = std::result::Result<T, Error>;

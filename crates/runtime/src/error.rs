use capability::{AccessKind, Operation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    /// A consensus node answered with a non-success ledger status code.
    #[error("ledger status: {0}")]
    Ledger(String),

    /// The contract rejected the call with a revert reason.
    #[error("contract reverted: {0}")]
    ContractRevert(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    /// The capability decider found no permitted path; refused pre-network.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// The active backend cannot execute this operation on the decided path.
    #[error("access path {access:?} is not supported for {operation} by this backend")]
    UnsupportedAccess {
        operation: Operation,
        access: AccessKind,
    },

    /// A built transaction of a shape this backend cannot sign or submit.
    #[error("unsupported transaction shape for this backend")]
    UnsupportedTransaction,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("timeout waiting for response")]
    Timeout,

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Relay(#[from] relay::Error),

    #[error(transparent)]
    Store(#[from] store::Error),

    #[error(transparent)]
    Capability(#[from] capability::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reshape a runtime failure into the bus's handler-error envelope: meaning
/// lands in a stable code, detail in the message.
impl From<Error> for bus::HandlerError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::OperationNotAllowed(_) => "operation_not_allowed",
            Error::Ledger(_) => "ledger_error",
            Error::ContractRevert(_) => "contract_revert",
            Error::Network(_) | Error::Rpc(_) | Error::Relay(_) => "network_error",
            Error::Timeout => "timeout",
            Error::Capability(_) => "invalid_request",
            _ => "internal_error",
        };
        bus::HandlerError::new(code, err.to_string())
    }
}

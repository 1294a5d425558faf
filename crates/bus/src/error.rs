//! Bus error types.

use thiserror::Error;

/// Dispatch errors.
///
/// `HandlerNotFound` and `InvalidHandler` are wiring defects: in a correct
/// deployment the registry is populated once at startup and neither occurs.
#[derive(Debug, Error)]
pub enum Error {
    /// No handler is bound for the executed request type.
    #[error("no handler bound for request type {0}")]
    HandlerNotFound(&'static str),

    /// A handler binding could not be established or resolved.
    #[error("invalid handler binding for request type {0}")]
    InvalidHandler(&'static str),

    /// The bound handler failed; its error propagates to the caller.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// A structured, un-formatted failure raised by a handler.
///
/// `code` is a stable machine-readable discriminator; callers localize and
/// format `message` for display.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct HandlerError {
    pub code: &'static str,
    pub message: String,
}

impl HandlerError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

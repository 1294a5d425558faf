//! CLI error types.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A field the operator typed failed its key or id parse.
    #[error("invalid {field}: {detail}")]
    Invalid {
        field: &'static str,
        detail: String,
    },

    /// The configured backend cannot be driven from this binary.
    #[error("{0}")]
    Unsupported(&'static str),

    /// The submission outlived the configured timeout.
    #[error("timed out after {0}s waiting for the backend")]
    Timeout(u64),

    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    #[error(transparent)]
    Bus(#[from] bus::Error),

    #[error(transparent)]
    Store(#[from] store::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

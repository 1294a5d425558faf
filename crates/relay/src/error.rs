//! Relay error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Sealing or opening a payload failed (wrong key, tampered data).
    #[error("cipher error: {0}")]
    Cipher(String),

    /// A payload was not valid base64 or JSON.
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("failed to encode message: {0}")]
    Codec(#[from] serde_json::Error),

    /// The relay channel closed while waiting for a message.
    #[error("relay channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

//! Wallet-relay wire protocol.
//!
//! A paired wallet and this library exchange JSON envelopes over a named
//! pub/sub relay topic. Each envelope's `data` payload is symmetrically
//! encrypted with a key scoped to that topic, negotiated at pairing time.
//! Transaction messages carry a correlation id; the wallet's response is
//! matched on it. This crate enforces no response timeout — the wallet side
//! is a human approving (or ignoring) a prompt, so cancellation belongs to
//! the caller.

mod cipher;
mod error;
mod protocol;
mod transport;

pub use cipher::{TopicCipher, TopicKey};
pub use error::{Error, Result};
pub use protocol::{
    Envelope, MessageKind, PairingPayload, TransactionPayload, TransactionResponsePayload,
};
pub use transport::{CHANNEL_CAPACITY, InProcessRelay, RelayTransport, Subscription};

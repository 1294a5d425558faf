//! Relay transport seam.

use crate::protocol::Envelope;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

/// Envelopes buffered per subscriber before the oldest are dropped.
pub const CHANNEL_CAPACITY: usize = 64;

/// Publish/subscribe access to relay topics.
///
/// Production deployments put a real message relay behind this trait; tests
/// and the paired-wallet simulator use [`InProcessRelay`].
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Publish an envelope on its topic. Publishing to a topic nobody is
    /// subscribed to is not an error; the message is simply unheard.
    async fn publish(&self, envelope: Envelope) -> Result<()>;

    /// Subscribe to a topic; yields envelopes published after this call.
    async fn subscribe(&self, topic: &str) -> Result<Subscription>;
}

/// A live subscription to one topic.
pub struct Subscription {
    receiver: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Wait for the next envelope. Open-ended: deadline enforcement is the
    /// caller's, typically via `tokio::time::timeout`.
    pub async fn recv(&mut self) -> Result<Envelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Ok(envelope),
                // Skipped messages are gone; keep draining what remains.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "relay subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(Error::ChannelClosed),
            }
        }
    }
}

/// Broadcast-channel relay living inside the process.
#[derive(Default)]
pub struct InProcessRelay {
    topics: Mutex<HashMap<String, broadcast::Sender<Envelope>>>,
}

impl InProcessRelay {
    pub fn new() -> Self {
        Self::default()
    }

    async fn sender_for(&self, topic: &str) -> broadcast::Sender<Envelope> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl RelayTransport for InProcessRelay {
    async fn publish(&self, envelope: Envelope) -> Result<()> {
        tracing::debug!(topic = %envelope.topic, kind = ?envelope.kind, "publishing envelope");
        let sender = self.sender_for(&envelope.topic).await;
        // A send error only means no live subscribers.
        let _ = sender.send(envelope);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let sender = self.sender_for(topic).await;
        Ok(Subscription {
            receiver: sender.subscribe(),
        })
    }
}

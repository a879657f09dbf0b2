//! Broadcast sink - fan-out of normalized records to subscribers
//!
//! Feeds only see the [`BroadcastSink`] trait. The production sink is [`WsHub`],
//! which serializes each broadcast once and hands the text frame to every
//! connected WebSocket viewer through a `tokio::sync::broadcast` channel.

use std::sync::Arc;
use tokio::sync::broadcast;
use worldscope_common::{Channel, Envelope};

/// Number of frames a slow viewer may fall behind before it starts skipping
pub const DEFAULT_HUB_CAPACITY: usize = 16;

/// Outbound side of the publish/subscribe channel
pub trait BroadcastSink: Send + Sync {
    fn broadcast(&self, channel: Channel, payload: serde_json::Value);
}

/// WebSocket fan-out hub
pub struct WsHub {
    tx: broadcast::Sender<Arc<str>>,
}

impl WsHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new viewer. It only sees frames sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_CAPACITY)
    }
}

impl BroadcastSink for WsHub {
    fn broadcast(&self, channel: Channel, payload: serde_json::Value) {
        let frame = match serde_json::to_string(&Envelope::new(channel, payload)) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize {} frame: {}", channel, e);
                return;
            }
        };

        // at-most-once: with nobody connected the frame is simply dropped
        match self.tx.send(Arc::from(frame)) {
            Ok(receivers) => tracing::trace!("{} sent to {} subscribers", channel, receivers),
            Err(_) => tracing::trace!("{} dropped, no subscribers", channel),
        }
    }
}

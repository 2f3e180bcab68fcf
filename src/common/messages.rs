//! Cross-component messages

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Asks listeners to reload the launcher background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundRefreshMessage {
    pub force_refresh: bool,
}

impl BackgroundRefreshMessage {
    pub fn new(force_refresh: bool) -> Self {
        Self { force_refresh }
    }
}

impl Default for BackgroundRefreshMessage {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Broadcast channel for one message type
#[derive(Debug, Clone)]
pub struct MessageBus<M> {
    tx: broadcast::Sender<M>,
}

impl<M: Clone + std::fmt::Debug> MessageBus<M> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send to every current subscriber, returning how many received it
    pub fn publish(&self, message: M) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(message)) => {
                debug!(?message, "No listeners for message");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<M> {
        self.tx.subscribe()
    }
}

//! Transient user-visible status text
//!
//! Written from the controller and from the persistence worker, observed by the
//! front end through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A status line plus the generation that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    generation: u64,
}

impl StatusMessage {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug)]
pub struct StatusChannel {
    tx: Arc<watch::Sender<StatusMessage>>,
}

impl StatusChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusMessage::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, text: impl Into<String>) {
        let text = text.into();
        self.tx.send_modify(|status| {
            status.generation += 1;
            status.text = text;
        });
    }

    pub fn current(&self) -> String {
        self.tx.borrow().text.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusMessage> {
        self.tx.subscribe()
    }

    /// Clear the status after `delay` unless something newer was published
    pub fn clear_after(&self, delay: Duration) -> JoinHandle<()> {
        let tx = Arc::clone(&self.tx);
        let generation = tx.borrow().generation;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_if_modified(|status| {
                if status.generation != generation || status.text.is_empty() {
                    return false;
                }
                status.generation += 1;
                status.text.clear();
                true
            });
        })
    }
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}

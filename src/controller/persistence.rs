//! Best-effort persistence of controller state
//!
//! Snapshots are written by a single background worker in submission order.
//! Callers get a [`PendingSave`] they may await for the outcome or drop to
//! fire and forget. In-memory state is never rolled back on failure.

use anyhow::{Result, anyhow};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::common::status::StatusChannel;
use crate::config::{SettingsSnapshot, SettingsStore};
use crate::constants;

struct SaveRequest {
    snapshot: SettingsSnapshot,
    reply: oneshot::Sender<Result<()>>,
}

/// Handle to the persistence worker
#[derive(Debug, Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl std::fmt::Debug for SaveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveRequest")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl SaveQueue {
    /// Start the worker on the current runtime
    pub fn spawn(store: Arc<dyn SettingsStore>, status: Arc<StatusChannel>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SaveRequest>();

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let result = request.snapshot.save(store.as_ref()).await;

                match &result {
                    Ok(()) => {
                        info!(
                            enabled = request.snapshot.auto_clicker_enabled,
                            trigger_key = %request.snapshot.trigger_key,
                            click_key = %request.snapshot.click_key,
                            "Settings saved"
                        );
                        status.clear_after(constants::status::CLEAR_DELAY);
                    }
                    Err(err) => {
                        warn!(error = ?err, "Failed to save settings");
                        status.publish(format!("Save failed: {err:#}"));
                    }
                }

                if request.reply.send(result).is_err() {
                    debug!("Save result dropped by caller");
                }
            }
            debug!("Save worker stopped");
        });

        Self { tx }
    }

    /// Queue a snapshot for writing
    pub fn submit(&self, snapshot: SettingsSnapshot) -> PendingSave {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(SaveRequest { snapshot, reply }).is_err() {
            // The dropped reply sender makes the pending save resolve to an error
            warn!("Save worker is not running, settings not persisted");
        }
        PendingSave { rx }
    }
}

/// Outcome of a queued save
///
/// Dropping it does not cancel the save.
#[derive(Debug)]
pub struct PendingSave {
    rx: oneshot::Receiver<Result<()>>,
}

impl Future for PendingSave {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(anyhow!("settings save worker has stopped")))
        })
    }
}

//! Owner-thread dispatch
//!
//! The settings controller is single-threaded (`!Send`). Work that completes on
//! other threads (key capture, background I/O) is funnelled back onto the
//! owning thread through an [`OwnerThread`] handle and executed in order.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::spawn_local;
use tracing::warn;

type LocalCall<S> = Box<dyn FnOnce(Rc<S>) -> Pin<Box<dyn Future<Output = ()>>> + Send>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("owner thread has shut down")]
    Closed,
    #[error("call was dropped before returning (owner task probably panicked)")]
    Dropped,
}

/// `Send + Sync` handle that runs closures against state pinned to one thread
///
/// Must be created inside a `tokio::task::LocalSet`.
pub struct OwnerThread<S> {
    tx: mpsc::Sender<LocalCall<S>>,
}

impl<S> Clone for OwnerThread<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: 'static> OwnerThread<S> {
    pub fn new(state: Rc<S>) -> Self {
        let (tx, mut rx) = mpsc::channel::<LocalCall<S>>(16);

        spawn_local(async move {
            // Calls run to completion one at a time, in submission order
            while let Some(call) = rx.recv().await {
                call(state.clone()).await;
            }
        });

        Self { tx }
    }

    /// Run `function` on the owner thread and wait for its result
    pub async fn run<F, Fut, Output>(&self, function: F) -> Result<Output, DispatchError>
    where
        F: FnOnce(Rc<S>) -> Fut + Send + 'static,
        Fut: Future<Output = Output> + 'static,
        Output: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let call: LocalCall<S> = Box::new(move |state| {
            let future: Pin<Box<dyn Future<Output = ()>>> = Box::pin(async move {
                let output = function(state).await;
                if result_tx.send(output).is_err() {
                    warn!("Dispatch caller went away before the result was delivered");
                }
            });
            future
        });

        self.tx.send(call).await.map_err(|_| DispatchError::Closed)?;
        result_rx.await.map_err(|_| DispatchError::Dropped)
    }
}

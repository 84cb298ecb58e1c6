//! Cancellation for in-flight solver calls.

use super::FaultError;
use std::future::Future;
use tokio::sync::watch;

/// Creates a linked [CancelHandle] and [CancelToken].
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// The sending half. Cancels every [CancelToken] cloned from its pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns a new [CancelToken] linked to this handle.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// The receiving half, passed into every solver call.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// Returns `true` once cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been signalled. Never resolves if the handle was dropped
    /// without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `fut` to completion unless cancellation is signalled first, in which case `fut` is
    /// dropped and [FaultError::Cancelled] is returned.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, FaultError>
    where
        F: Future<Output = Result<T, FaultError>>,
    {
        if self.is_cancelled() {
            return Err(FaultError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(FaultError::Cancelled),
            res = fut => res,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::never()
    }
}

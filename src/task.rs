//! Cancellable delayed work.
//!
//! Upload and publish both wait a fixed time before producing their result.
//! [`DelayedTask`] runs that wait on a worker thread and lets the owner call
//! it off:
//!
//! ```text
//! spawn ──► worker waits on cancel channel ──┬─ timeout   → run work, send result
//!                                            └─ cancelled → exit, no result
//! ```
//!
//! Cancelling (explicitly or by dropping the task) only interrupts the wait.
//! Once the work has started it runs to completion, but a cancelled task's
//! result is never observed. Work that panics ends the task with
//! [`TaskError::Lost`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("task was cancelled")]
    Cancelled,
    #[error("task stopped without producing a result")]
    Lost,
}

/// Work that runs after a delay unless cancelled first.
#[derive(Debug)]
pub struct DelayedTask<T> {
    cancel: Option<Sender<()>>,
    result: Receiver<T>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DelayedTask<T> {
    pub fn spawn<F>(delay: Duration, work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let (result_tx, result_rx) = mpsc::channel();

        let handle = thread::spawn(move || match cancel_rx.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {
                let _ = result_tx.send(work());
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("delayed task cancelled before running");
            }
        });

        Self {
            cancel: Some(cancel_tx),
            result: result_rx,
            handle: Some(handle),
        }
    }
}

impl<T> DelayedTask<T> {
    /// Stop the task if it is still waiting. Its result, if any, is discarded.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    /// The result, if the work has finished. Never blocks.
    ///
    /// `Ok(None)` while the task is still waiting or working. After the
    /// result has been taken once, further calls report [`TaskError::Lost`].
    pub fn try_take(&mut self) -> Result<Option<T>, TaskError> {
        if self.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        match self.result.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TaskError::Lost),
        }
    }

    /// Block until the work finishes.
    pub fn wait(mut self) -> Result<T, TaskError> {
        if self.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        let value = self.result.recv().map_err(|_| TaskError::Lost);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        value
    }
}

impl<T> Drop for DelayedTask<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

//! # Scheduling handles.
//!
//! A [`Handle`] is returned when an application's entry method is dispatched onto the
//! worker pool. It is the registry key and the only way to ask whether the work is
//! still executing and how it ended.
//!
//! Completion is signalled through a [`watch`] channel: the pool-side [`Completer`]
//! publishes the terminal outcome once, every clone of the handle observes it. If the
//! pool drops the work without completing it (pool released), the channel closes and
//! the handle reports the work as finished without a failure.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::time::error::Elapsed;

use crate::error::AppError;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a scheduling handle. Displayed as `0x…`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[derive(Clone, Debug)]
enum Completion {
    Pending,
    Done(Option<Arc<AppError>>),
}

/// Opaque reference to one dispatched entry method.
#[derive(Clone)]
pub struct Handle {
    id: HandleId,
    rx: watch::Receiver<Completion>,
}

impl Handle {
    /// Returns the handle's identity.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Returns `true` while the dispatched work has not completed.
    pub fn is_running(&self) -> bool {
        matches!(*self.rx.borrow(), Completion::Pending) && self.rx.has_changed().is_ok()
    }

    /// Returns the terminal failure, if the work finished with one.
    ///
    /// Never blocks; returns `None` while the work is still running.
    pub fn exception(&self) -> Option<Arc<AppError>> {
        match &*self.rx.borrow() {
            Completion::Done(failure) => failure.clone(),
            Completion::Pending => None,
        }
    }

    /// Resolves once the dispatched work has completed.
    pub async fn finished(&self) {
        let mut rx = self.rx.clone();
        // A closed channel means the pool dropped the work: finished as well.
        let _ = rx
            .wait_for(|c| matches!(c, Completion::Done(_)))
            .await;
    }

    /// Waits up to `timeout` for completion, then returns the terminal failure (if any).
    pub async fn exception_within(
        &self,
        timeout: Duration,
    ) -> Result<Option<Arc<AppError>>, Elapsed> {
        tokio::time::timeout(timeout, self.finished()).await?;
        Ok(self.exception())
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Pool-side half of a handle: records the outcome and wakes the supervisor.
pub(crate) struct Completer {
    tx: watch::Sender<Completion>,
    wake: Arc<Notify>,
}

impl Completer {
    /// Creates a linked completer/handle pair. `wake` is notified on completion or drop.
    pub(crate) fn pair(wake: Arc<Notify>) -> (Completer, Handle) {
        let (tx, rx) = watch::channel(Completion::Pending);
        let handle = Handle {
            id: HandleId::next(),
            rx,
        };
        (Completer { tx, wake }, handle)
    }

    /// Records the terminal outcome.
    pub(crate) fn complete(self, failure: Option<AppError>) {
        self.tx.send_replace(Completion::Done(failure.map(Arc::new)));
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        self.wake.notify_one();
    }
}

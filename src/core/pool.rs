//! # Worker pool: a dedicated multi-thread runtime for application entry methods.
//!
//! ## Dispatch
//! ```text
//! submit(logic, state) ──► spawn(wrapper) on pool ──► (Gate, Handle)
//!
//! wrapper:
//!   ├─► await gate            (opened after the registry insert)
//!   ├─► logic.run(state)      (panics caught → AppError::Panicked)
//!   └─► completer.complete()  (handle stops reporting running; supervisor woken)
//! ```
//!
//! ## Rules
//! - The entry method never starts before its gate is opened.
//! - A dropped gate means the registration was abandoned: the work completes without running.
//! - Work runs under the tracing subscriber that was current at submission.
//! - `release()` shuts the runtime down in the background; it never blocks, so it is
//!   safe inside async contexts. Work still running is dropped, not joined.

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{Notify, oneshot};
use tracing::instrument::WithSubscriber;

use crate::apps::{AppRef, AppState};
use crate::core::handle::{Completer, Handle};
use crate::error::{AppError, SupervisorError};

/// Fixed-size pool of worker threads.
pub(crate) struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    spawner: tokio::runtime::Handle,
    workers: usize,
}

/// Opens the execution gate of one submitted entry method.
pub(crate) struct Gate {
    tx: oneshot::Sender<()>,
}

impl Gate {
    pub(crate) fn open(self) {
        let _ = self.tx.send(());
    }
}

impl WorkerPool {
    /// Builds a pool with `workers` threads (minimum 1) named `<name>-worker`.
    pub(crate) fn new(name: &str, workers: usize) -> Result<Self, SupervisorError> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name(format!("{name}-worker"))
            .enable_all()
            .build()
            .map_err(|source| SupervisorError::Pool { source })?;

        Ok(Self {
            spawner: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            workers,
        })
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn is_released(&self) -> bool {
        self.runtime.lock().is_none()
    }

    /// Dispatches `logic.run(state)`; execution waits for the returned [`Gate`].
    pub(crate) fn submit(
        &self,
        wake: Arc<Notify>,
        logic: AppRef,
        state: AppState,
    ) -> (Gate, Handle) {
        let (completer, handle) = Completer::pair(wake);
        let (tx, rx) = oneshot::channel();

        drop(self.spawner.spawn(async move {
            if rx.await.is_err() {
                completer.complete(None);
                return;
            }

            let failure = match std::panic::AssertUnwindSafe(logic.run(state.clone()))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {
                    if state.is_running() {
                        tracing::warn!(
                            "Application '{}' returned from run() without a stop request; \
                             expected a `while state.is_running()` loop",
                            state.name()
                        );
                    }
                    None
                }
                Ok(Err(err)) => Some(err),
                Err(panic) => Some(AppError::Panicked {
                    message: panic_message(&*panic),
                }),
            };
            completer.complete(failure);
        }
        .with_current_subscriber()));

        (Gate { tx }, handle)
    }

    /// Shuts the runtime down without waiting for running work. Idempotent.
    pub(crate) fn release(&self) -> bool {
        match self.runtime.lock().take() {
            Some(runtime) => {
                runtime.shutdown_background();
                true
            }
            None => false,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.release();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::apps::AppFn;

    fn pool() -> WorkerPool {
        WorkerPool::new("test-pool", 2).expect("pool")
    }

    #[tokio::test]
    async fn test_entry_waits_for_gate() {
        let pool = pool();
        let started = Arc::new(Notify::new());
        let signal = Arc::clone(&started);
        let app = AppFn::arc("gated", move |_state: AppState| {
            let signal = Arc::clone(&signal);
            async move {
                signal.notify_one();
                Ok::<(), AppError>(())
            }
        });

        let (gate, handle) = pool.submit(Arc::new(Notify::new()), app, AppState::new("gated"));
        let early = tokio::time::timeout(Duration::from_millis(50), started.notified()).await;
        assert!(early.is_err(), "entry ran before the gate was opened");
        assert!(handle.is_running());

        gate.open();
        tokio::time::timeout(Duration::from_secs(1), handle.finished())
            .await
            .expect("finished");
        assert!(handle.exception().is_none());
    }

    #[tokio::test]
    async fn test_dropped_gate_completes_without_running() {
        let pool = pool();
        let app = AppFn::arc("never", |_state: AppState| async {
            Err::<(), AppError>(AppError::fail("should not run"))
        });

        let (gate, handle) = pool.submit(Arc::new(Notify::new()), app, AppState::new("never"));
        drop(gate);
        tokio::time::timeout(Duration::from_secs(1), handle.finished())
            .await
            .expect("finished");
        assert!(handle.exception().is_none());
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let pool = pool();
        let app = AppFn::arc("panics", |_state: AppState| async {
            let frames: Vec<u8> = Vec::new();
            let _header = frames[3];
            Ok::<(), AppError>(())
        });

        let (gate, handle) = pool.submit(Arc::new(Notify::new()), app, AppState::new("panics"));
        gate.open();
        let failure = handle
            .exception_within(Duration::from_secs(1))
            .await
            .expect("finished")
            .expect("failure");

        assert_eq!(failure.as_label(), "app_panicked");
        assert!(failure.to_string().contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let pool = pool();
        assert_eq!(pool.workers(), 2);
        assert!(pool.release());
        assert!(!pool.release());
        assert!(pool.is_released());
    }
}

//! # Supervisor: registration, termination protocol, liveness sweep and run loop.
//!
//! The [`Supervisor`] owns the worker pool, the registry of running applications and
//! the event bus. Applications are stopped cooperatively only: the supervisor clears
//! the running flag and waits. Escalation is a diagnostic, never a kill.
//!
//! ## High-level architecture
//! ```text
//! start_application(logic, state)
//!   ├─► pool.submit()          ──► (Gate, Handle)
//!   ├─► registry.insert(handle → entry)
//!   ├─► gate.open()            (entry method may start now)
//!   └─► autostart? ──► run()   (blocks until the run loop exits)
//!
//! run():  Idle ──► Running ──► Draining ──► Stopped
//!   loop {
//!     ├─► application_check(None) ──► dead handles (failures logged line by line)
//!     ├─► remove_application(h) for each dead handle
//!     ├─► registry empty? ──► break
//!     └─► wait for a completion wake-up or poll_interval
//!   }
//!   interrupt (OS signal / interrupt()) ──► break
//!   shutdown() ──► pool.release()
//!
//! remove_application(h):
//!   ├─► clear running flag
//!   ├─► wait up to `grace` for completion
//!   │     └─ elapsed ──► loop { warn, EscalationAttempted, probe failure for `probe_timeout` }
//!   │                    until the work completes
//!   └─► registry.remove(h)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use appvisor::{AppError, AppFn, AppState, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::named("doc");
//!     cfg.workers = 1;
//!     cfg.catch_signals = false;
//!     let sup = Supervisor::builder(cfg).build()?;
//!
//!     let ticker = AppFn::arc("ticker", |state: AppState| async move {
//!         while state.is_running() {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<_, AppError>(())
//!     });
//!     let state = AppState::new("ticker");
//!     let handle = sup.start_application(ticker, state.clone()).await?;
//!
//!     sup.remove_application(&handle).await?;
//!     assert!(!state.is_running());
//!     assert!(sup.is_empty().await);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::apps::{AppRef, AppState};
use crate::core::{
    builder::SupervisorBuilder,
    config::SupervisorConfig,
    handle::Handle,
    pool::WorkerPool,
    registry::{AppEntry, Registry},
    shutdown,
};
use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind};

/// Lifecycle of a supervisor's run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorStatus {
    /// Constructed; run loop not entered yet.
    Idle,
    /// Run loop is sweeping.
    Running,
    /// Run loop exited; remaining applications are being removed.
    Draining,
    /// Registry drained and worker pool released.
    Stopped,
}

/// Owns the registry of running applications and the worker pool they run on.
pub struct Supervisor {
    cfg: SupervisorConfig,
    pool: WorkerPool,
    registry: Registry,
    bus: Bus,
    wake: Arc<Notify>,
    interrupt: CancellationToken,
    started: AtomicBool,
    status: Mutex<SupervisorStatus>,
}

impl Supervisor {
    /// Returns a builder for a supervisor with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: SupervisorConfig) -> Result<Self, SupervisorError> {
        let pool = WorkerPool::new(&cfg.name, cfg.workers_clamped())?;
        let bus = Bus::new(cfg.bus_capacity_clamped());
        info!(
            "Supervisor started ({}) instance with {} workers",
            cfg.name,
            pool.workers()
        );

        Ok(Self {
            cfg,
            pool,
            registry: Registry::new(),
            bus,
            wake: Arc::new(Notify::new()),
            interrupt: CancellationToken::new(),
            started: AtomicBool::new(false),
            status: Mutex::new(SupervisorStatus::Idle),
        })
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Returns the configuration this supervisor was built with.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> SupervisorStatus {
        *self.status.lock()
    }

    fn set_status(&self, status: SupervisorStatus) {
        *self.status.lock() = status;
    }

    /// Subscribes to the supervisor's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Number of registered applications.
    pub async fn len(&self) -> usize {
        self.registry.len().await
    }

    /// Returns `true` if no application is registered.
    pub async fn is_empty(&self) -> bool {
        self.registry.is_empty().await
    }

    /// Returns `true` if the handle is registered with this supervisor.
    pub async fn contains(&self, handle: &Handle) -> bool {
        self.registry.contains(handle.id()).await
    }

    /// Snapshot of registered handles in registration order.
    pub async fn handles(&self) -> Vec<Handle> {
        self.registry.handles().await
    }

    /// Returns the state of the application registered under `handle`.
    pub async fn application(&self, handle: &Handle) -> Option<AppState> {
        self.registry.get(handle.id()).await.map(|e| e.state)
    }

    /// Dispatches `logic.run(state)` onto the worker pool and registers it.
    ///
    /// The entry method does not start before the registry entry exists.
    ///
    /// **Blocking with autostart**: if the supervisor was built with `autostart` and the
    /// run loop has not been entered yet, this call enters it and only returns once the
    /// run loop has exited (registry empty or interrupt).
    ///
    /// ### Errors
    /// - [`SupervisorError::AlreadyRegistered`] if `state` was registered before;
    /// - [`SupervisorError::NotAccepting`] once the supervisor is draining or stopped.
    pub async fn start_application(
        &self,
        logic: AppRef,
        state: AppState,
    ) -> Result<Handle, SupervisorError> {
        let status = self.status();
        if matches!(
            status,
            SupervisorStatus::Draining | SupervisorStatus::Stopped
        ) || self.pool.is_released()
        {
            return Err(SupervisorError::NotAccepting {
                server: self.cfg.name.clone(),
                status,
            });
        }
        if !state.claim_registration() {
            return Err(SupervisorError::AlreadyRegistered {
                name: state.name(),
                id: state.id(),
            });
        }

        let kind = logic.kind();
        let (gate, handle) = self
            .pool
            .submit(Arc::clone(&self.wake), logic, state.clone());
        self.registry
            .insert(AppEntry {
                state: state.clone(),
                kind,
                handle: handle.clone(),
            })
            .await;
        gate.open();

        debug!(
            "{}(name: '{}', app_id: {}) added to Supervisor('{}')",
            kind,
            state.name(),
            state.id(),
            self.cfg.name
        );
        self.bus.publish(
            Event::new(EventKind::AppRegistered)
                .with_app(state.name())
                .with_app_id(state.id())
                .with_handle(handle.id()),
        );

        if self.cfg.autostart && !self.started.load(Ordering::Acquire) {
            debug!("Starting application server automatically");
            self.run().await;
        }
        Ok(handle)
    }

    /// Removes an application: graceful stop, then escalation diagnostics until it ends.
    ///
    /// 1. Clears the application's running flag (even if it already finished).
    /// 2. Waits up to `grace` for the entry method to complete. If it does not, each
    ///    escalation round logs the application as unresponsive, publishes
    ///    [`EventKind::EscalationAttempted`] and probes for a terminal failure for up to
    ///    `probe_timeout`. Rounds repeat until the work completes: threads cannot be
    ///    preempted, so an application that never checks its flag is never removed.
    /// 3. Deletes the registry entry.
    ///
    /// ### Errors
    /// [`SupervisorError::UnknownHandle`] if `handle` is not registered here; the registry
    /// is left unchanged.
    pub async fn remove_application(&self, handle: &Handle) -> Result<(), SupervisorError> {
        let id = handle.id();
        let entry = self
            .registry
            .get(id)
            .await
            .ok_or(SupervisorError::UnknownHandle { handle: id })?;

        debug!("Sending stop to application at {id}");
        entry.state.clear_running();
        self.publish_for(EventKind::StopRequested, &entry);

        debug!("Waiting for {id} to terminate...");
        if tokio::time::timeout(self.cfg.grace, handle.finished())
            .await
            .is_err()
        {
            self.escalate(&entry).await;
        }

        info!(
            "Application {id} {}(name: '{}') terminated",
            entry.kind,
            entry.state.name()
        );
        self.registry.remove(id).await;
        self.publish_for(EventKind::AppRemoved, &entry);
        Ok(())
    }

    /// Escalation rounds for an application that ignored its stop request.
    async fn escalate(&self, entry: &AppEntry) {
        let id = entry.handle.id();
        loop {
            warn!("Application {id} is not responding to termination signal");
            self.publish_for(EventKind::AppUnresponsive, entry);

            info!("Attempting forceful termination for {id}");
            let probe = entry.handle.exception_within(self.cfg.probe_timeout).await;

            let mut ev = self.event_for(EventKind::EscalationAttempted, entry);
            if let Ok(Some(failure)) = &probe {
                error!("Application at {id} threw exception: {failure}");
                ev = ev.with_reason(failure.as_label());
            }
            self.bus.publish(ev);

            if probe.is_ok() {
                return;
            }
        }
    }

    /// Liveness check.
    ///
    /// - With a handle: returns it if its work has stopped executing, otherwise nothing.
    /// - Without (sweep): returns every registered handle whose work has stopped, in
    ///   registration order. Failures are logged line by line at error level; clean
    ///   exits get one warning.
    ///
    /// Never modifies the registry; callers remove the returned handles.
    pub async fn application_check(&self, handle: Option<&Handle>) -> Vec<Handle> {
        if let Some(handle) = handle {
            return if handle.is_running() {
                Vec::new()
            } else {
                vec![handle.clone()]
            };
        }

        let mut not_alive = Vec::new();
        for handle in self.registry.handles().await {
            if handle.is_running() {
                continue;
            }
            let id = handle.id();
            match handle.exception() {
                Some(failure) => {
                    error!("Application at {id} has thrown an unhandled error");
                    for line in failure.trace_lines() {
                        error!("{id}: {line}");
                    }
                    self.bus.publish(
                        Event::new(EventKind::AppFailed)
                            .with_handle(id)
                            .with_reason(failure.as_label()),
                    );
                }
                None => {
                    warn!("Application at {id} has stopped running. Terminating");
                    self.bus
                        .publish(Event::new(EventKind::AppExited).with_handle(id));
                }
            }
            not_alive.push(handle);
        }
        not_alive
    }

    /// Removes every registered application, in registration order.
    ///
    /// Does not release the worker pool. No-op on an empty registry.
    pub async fn shutdown(&self) {
        let handles = self.registry.handles().await;
        if handles.is_empty() {
            return;
        }

        info!("Shutdown Supervisor ({}) signal received", self.cfg.name);
        for handle in handles {
            info!("Terminating application at {}", handle.id());
            if let Err(err) = self.remove_application(&handle).await {
                debug!("Skipping {}: {err}", handle.id());
            }
        }
    }

    /// Runs the supervision loop on the calling task until the registry is empty or an
    /// interrupt arrives, then drains all applications and releases the worker pool.
    ///
    /// A second call (or a call while autostart already runs the loop) returns immediately.
    pub async fn run(&self) {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("Supervisor ({}) run loop already started", self.cfg.name);
            return;
        }
        self.set_status(SupervisorStatus::Running);
        if self.cfg.catch_signals {
            debug!("Press Ctrl-C to stop it all");
        }

        tokio::select! {
            _ = shutdown::wait_for_interrupt(&self.interrupt, self.cfg.catch_signals) => {
                info!("Interrupt received by Supervisor ({})", self.cfg.name);
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
            }
            _ = self.supervise() => {}
        }

        self.set_status(SupervisorStatus::Draining);
        self.shutdown().await;
        if self.pool.release() {
            debug!("Worker pool of Supervisor ({}) released", self.cfg.name);
            self.bus.publish(Event::new(EventKind::PoolReleased));
        }
        self.set_status(SupervisorStatus::Stopped);
    }

    /// Requests the run loop to drain, as an interrupt signal would.
    ///
    /// If the run loop has not started yet, it drains as soon as it does.
    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    /// Sweep → remove → empty check, woken by completions or `poll_interval`.
    async fn supervise(&self) {
        let tick = self.cfg.poll_interval_clamped();
        loop {
            for handle in self.application_check(None).await {
                if let Err(err) = self.remove_application(&handle).await {
                    debug!("Skipping {}: {err}", handle.id());
                }
            }

            if self.registry.is_empty().await {
                info!("No applications running");
                self.bus.publish(Event::new(EventKind::RegistryEmpty));
                break;
            }

            tokio::select! {
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep(tick) => {}
            }
        }
    }

    fn event_for(&self, kind: EventKind, entry: &AppEntry) -> Event {
        Event::new(kind)
            .with_app(entry.state.name())
            .with_app_id(entry.state.id())
            .with_handle(entry.handle.id())
    }

    fn publish_for(&self, kind: EventKind, entry: &AppEntry) {
        self.bus.publish(self.event_for(kind, entry));
    }
}

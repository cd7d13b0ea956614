//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registration events**: an application entered the registry
//! - **Termination events**: stop requests, unresponsive applications, escalation, removal
//! - **Server events**: shutdown requests, empty registry, pool release
//!
//! The [`Event`] struct carries metadata such as the timestamp, application name/id,
//! scheduling handle and a reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use appvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::AppFailed)
//!     .with_app("poller")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::AppFailed);
//! assert_eq!(ev.app.as_deref(), Some("poller"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use uuid::Uuid;

use crate::core::HandleId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration ===
    /// Application was dispatched to the worker pool and inserted into the registry.
    ///
    /// Sets: `app`, `app_id`, `handle`
    AppRegistered,

    // === Termination protocol ===
    /// The supervisor cleared the application's running flag.
    ///
    /// Sets: `app`, `app_id`, `handle`
    StopRequested,

    /// The application kept running past the grace period.
    ///
    /// Sets: `app`, `app_id`, `handle`
    AppUnresponsive,

    /// Escalation round fired for an unresponsive application.
    ///
    /// This is a diagnostic only: worker threads cannot be preempted, so nothing is killed.
    ///
    /// Sets: `app`, `app_id`, `handle`, `reason` (failure label, when one was probed)
    EscalationAttempted,

    /// Application's entry method returned an error or panicked.
    ///
    /// Sets: `handle`, `reason`
    AppFailed,

    /// Application's entry method returned without an error.
    ///
    /// Sets: `handle`
    AppExited,

    /// Registry entry deleted after the work completed.
    ///
    /// Sets: `app`, `app_id`, `handle`
    AppRemoved,

    // === Server ===
    /// Interrupt observed (OS signal or [`Supervisor::interrupt`](crate::Supervisor::interrupt)).
    ShutdownRequested,

    /// The run loop found the registry empty.
    RegistryEmpty,

    /// Worker pool released.
    PoolReleased,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Display name of the application, if applicable.
    pub app: Option<Arc<str>>,
    /// Identifier of the application, if applicable.
    pub app_id: Option<Uuid>,
    /// Scheduling handle, if applicable.
    pub handle: Option<HandleId>,
    /// Human-readable reason (failure labels, details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            app: None,
            app_id: None,
            handle: None,
            reason: None,
        }
    }

    /// Attaches an application name.
    #[inline]
    pub fn with_app(mut self, app: impl Into<Arc<str>>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Attaches an application identifier.
    #[inline]
    pub fn with_app_id(mut self, id: Uuid) -> Self {
        self.app_id = Some(id);
        self
    }

    /// Attaches a scheduling handle.
    #[inline]
    pub fn with_handle(mut self, handle: HandleId) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_escalation(&self) -> bool {
        matches!(self.kind, EventKind::EscalationAttempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::AppRegistered);
        let b = Event::new(EventKind::AppRemoved);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let id = Uuid::new_v4();
        let ev = Event::new(EventKind::EscalationAttempted)
            .with_app("screen")
            .with_app_id(id)
            .with_handle(HandleId::from_raw(3));

        assert!(ev.is_escalation());
        assert_eq!(ev.app_id, Some(id));
        assert_eq!(ev.handle, Some(HandleId::from_raw(3)));
        assert!(ev.reason.is_none());
    }
}

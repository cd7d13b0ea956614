//! # Application identity and cooperative running flag.
//!
//! [`AppState`] is shared between the application's own loop, whoever constructed it,
//! and the supervisor's registry entry. It is the only cancellation channel: the
//! supervisor clears the flag, the application observes it and returns.
//!
//! The flag is backed by a [`CancellationToken`], so an application can either poll
//! [`AppState::is_running`] or await [`AppState::stopped`]. Once cleared, the flag
//! never becomes true again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::apps::AppMeta;

struct Inner {
    name: RwLock<String>,
    meta: RwLock<AppMeta>,
    id: Uuid,
    running: CancellationToken,
    registered: AtomicBool,
}

/// Identity and running flag of one application instance.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Creates a running state with a freshly generated identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(name, Uuid::new_v4())
    }

    /// Creates a running state with a caller-supplied identifier.
    pub fn with_id(name: impl Into<String>, id: Uuid) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: RwLock::new(name.into()),
                meta: RwLock::new(AppMeta::default()),
                id,
                running: CancellationToken::new(),
                registered: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> String {
        self.inner.name.read().clone()
    }

    /// Replaces the display name. Names are labels only and need not be unique.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.inner.name.write() = name.into();
    }

    /// Returns a copy of the presentation settings.
    pub fn meta(&self) -> AppMeta {
        self.inner.meta.read().clone()
    }

    /// Replaces the presentation settings.
    pub fn set_meta(&self, meta: AppMeta) {
        *self.inner.meta.write() = meta;
    }

    /// Returns the process-unique identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Returns `true` until a stop was requested.
    pub fn is_running(&self) -> bool {
        !self.inner.running.is_cancelled()
    }

    /// Stops the application (self-initiated or by a holder of the state).
    ///
    /// Only clears the flag; the application's loop notices it on its next check.
    pub fn stop(&self) {
        tracing::info!("Application '{}' received stop signal", self.name());
        self.clear_running();
    }

    /// Resolves once the running flag has been cleared.
    pub async fn stopped(&self) {
        self.inner.running.cancelled().await
    }

    /// Clears the flag without the informational log line (supervisor path).
    pub(crate) fn clear_running(&self) {
        self.inner.running.cancel();
    }

    /// Marks the state as registered; returns `false` if it already was.
    pub(crate) fn claim_registration(&self) -> bool {
        !self.inner.registered.swap(true, Ordering::AcqRel)
    }

    /// Returns `true` if both values refer to the same application instance.
    pub fn same_instance(&self, other: &AppState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("name", &self.name())
            .field("id", &self.inner.id)
            .field("running", &self.is_running())
            .field("meta", &*self.inner.meta.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_state_is_running_with_unique_id() {
        let a = AppState::new("a");
        let b = AppState::new("a");
        assert!(a.is_running());
        assert_ne!(a.id(), b.id());
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn test_stop_is_visible_to_clones() {
        let a = AppState::new("a");
        let clone = a.clone();
        clone.stop();
        assert!(!a.is_running());
        assert!(a.same_instance(&clone));
    }

    #[test]
    fn test_name_is_mutable() {
        let a = AppState::new("before");
        a.set_name("after");
        assert_eq!(a.name(), "after");
    }

    #[test]
    fn test_meta_defaults_and_is_shared() {
        let a = AppState::new("a");
        assert_eq!(a.meta(), AppMeta::default());

        let clone = a.clone();
        clone.set_meta(AppMeta {
            maximised: true,
            ..AppMeta::default()
        });
        assert!(a.meta().maximised);
    }

    #[test]
    fn test_registration_can_be_claimed_once() {
        let a = AppState::new("a");
        assert!(a.claim_registration());
        assert!(!a.claim_registration());
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() {
        let a = AppState::new("a");
        let waiter = a.clone();
        let join = tokio::spawn(async move { waiter.stopped().await });

        a.stop();
        tokio::time::timeout(Duration::from_secs(1), join)
            .await
            .expect("stopped() did not resolve")
            .expect("join");
    }
}

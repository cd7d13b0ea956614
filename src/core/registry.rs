//! # Application registry: handle → entry bookkeeping.
//!
//! Owned exclusively by the [`Supervisor`](crate::Supervisor). Keys are [`HandleId`]s,
//! which are allocated monotonically, so iteration order equals insertion order.
//!
//! ## Rules
//! - Every key corresponds to exactly one outstanding dispatched entry method.
//! - Entries are only inserted by registration and only deleted by the termination
//!   protocol, after the work has completed.
//! - Readers receive clones/snapshots; no lock is held across an await point outside
//!   this module.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::apps::AppState;
use crate::core::handle::{Handle, HandleId};

/// Bookkeeping for one registered application.
#[derive(Clone)]
pub(crate) struct AppEntry {
    /// Back-reference to the application's identity and running flag.
    pub(crate) state: AppState,
    /// Application class, for log lines.
    pub(crate) kind: &'static str,
    /// Scheduling handle of the dispatched entry method.
    pub(crate) handle: Handle,
}

/// Handle-keyed registry of running applications.
#[derive(Default)]
pub(crate) struct Registry {
    apps: RwLock<BTreeMap<HandleId, AppEntry>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry; returns `false` if the handle was already present.
    pub(crate) async fn insert(&self, entry: AppEntry) -> bool {
        let mut apps = self.apps.write().await;
        apps.insert(entry.handle.id(), entry).is_none()
    }

    pub(crate) async fn get(&self, id: HandleId) -> Option<AppEntry> {
        self.apps.read().await.get(&id).cloned()
    }

    pub(crate) async fn remove(&self, id: HandleId) -> Option<AppEntry> {
        self.apps.write().await.remove(&id)
    }

    pub(crate) async fn contains(&self, id: HandleId) -> bool {
        self.apps.read().await.contains_key(&id)
    }

    /// Snapshot of registered handles in insertion order.
    pub(crate) async fn handles(&self) -> Vec<Handle> {
        self.apps
            .read()
            .await
            .values()
            .map(|e| e.handle.clone())
            .collect()
    }

    pub(crate) async fn len(&self) -> usize {
        self.apps.read().await.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.apps.read().await.is_empty()
    }
}

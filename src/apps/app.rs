//! # Application construction and binding.
//!
//! [`AppBuilder`] turns an [`Application`] into a registered [`App`]:
//! ```text
//! AppBuilder::new(name, logic)
//!   ├─ .with_id(uuid)            (optional, default: random v4)
//!   ├─ .with_meta(meta)          (optional, default: AppMeta::default())
//!   ├─ .with_supervisor(sup)     (optional explicit binding)
//!   └─ .launch() / .launch_in(&ambient)
//!          ├─► explicit supervisor, else ambient.get_or_create()
//!          └─► supervisor.start_application(logic, state)
//! ```
//!
//! When the binding falls back to a freshly created ambient default, that supervisor
//! autostarts, so `launch` returns only after its run loop has exited.

use std::sync::Arc;

use uuid::Uuid;

use crate::apps::{AppMeta, AppRef, AppState, Application};
use crate::core::{Ambient, Handle, Supervisor};
use crate::error::SupervisorError;

/// Construction parameters of one application instance.
pub struct AppBuilder {
    name: String,
    id: Option<Uuid>,
    meta: AppMeta,
    logic: AppRef,
    supervisor: Option<Arc<Supervisor>>,
}

impl AppBuilder {
    /// Starts building an application named `name` running `logic`.
    pub fn new<A: Application>(name: impl Into<String>, logic: A) -> Self {
        Self::from_ref(name, Arc::new(logic))
    }

    /// Same as [`AppBuilder::new`] for an already shared implementation.
    pub fn from_ref(name: impl Into<String>, logic: AppRef) -> Self {
        Self {
            name: name.into(),
            id: None,
            meta: AppMeta::default(),
            logic,
            supervisor: None,
        }
    }

    /// Uses a caller-supplied identifier instead of a random one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the presentation settings.
    pub fn with_meta(mut self, meta: AppMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Binds to an explicit supervisor instead of the ambient default.
    pub fn with_supervisor(mut self, supervisor: Arc<Supervisor>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Registers the application with its explicit supervisor or the process-wide ambient one.
    pub async fn launch(self) -> Result<App, SupervisorError> {
        self.launch_in(Ambient::global()).await
    }

    /// Registers the application with its explicit supervisor or the one held by `ambient`.
    ///
    /// ### Errors
    /// - [`SupervisorError::NotFound`] if no supervisor can be located or created;
    /// - any error of [`Supervisor::start_application`].
    pub async fn launch_in(self, ambient: &Ambient) -> Result<App, SupervisorError> {
        let supervisor = match self.supervisor {
            Some(sup) => sup,
            None => ambient.get_or_create()?,
        };
        let state = AppState::with_id(self.name, self.id.unwrap_or_else(Uuid::new_v4));
        state.set_meta(self.meta);
        let kind = self.logic.kind();

        let handle = supervisor
            .start_application(self.logic, state.clone())
            .await?;

        Ok(App {
            state,
            kind,
            handle,
            supervisor,
        })
    }
}

/// A registered application instance.
#[derive(Clone)]
pub struct App {
    state: AppState,
    kind: &'static str,
    handle: Handle,
    supervisor: Arc<Supervisor>,
}

impl App {
    /// Shared identity and running flag.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn name(&self) -> String {
        self.state.name()
    }

    pub fn id(&self) -> Uuid {
        self.state.id()
    }

    pub fn meta(&self) -> AppMeta {
        self.state.meta()
    }

    /// Application class as reported by [`Application::kind`].
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Requests the application to stop. The supervisor removes it on its next sweep
    /// once the entry method has returned.
    pub fn stop(&self) {
        self.state.stop();
    }

    /// Scheduling handle assigned at registration.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Supervisor the application is bound to.
    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("handle", &self.handle.id())
            .field("supervisor", &self.supervisor.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::apps::HorizontalAlign;
    use crate::core::SupervisorConfig;
    use crate::error::AppError;

    struct Screen;

    #[async_trait]
    impl Application for Screen {
        fn kind(&self) -> &'static str {
            "Screen"
        }

        async fn run(&self, state: AppState) -> Result<(), AppError> {
            state.stopped().await;
            Ok(())
        }
    }

    fn supervisor() -> Arc<Supervisor> {
        let cfg = SupervisorConfig {
            workers: 1,
            catch_signals: false,
            ..SupervisorConfig::named("apps")
        };
        Supervisor::builder(cfg).build().expect("sup")
    }

    #[tokio::test]
    async fn test_launch_with_explicit_supervisor() {
        let sup = supervisor();
        let id = Uuid::new_v4();
        let app = AppBuilder::new("Test Application", Screen)
            .with_id(id)
            .with_supervisor(Arc::clone(&sup))
            .launch_in(&Ambient::lookup_only())
            .await
            .expect("launch");

        assert!(app.is_running());
        assert_eq!(app.name(), "Test Application");
        assert_eq!(app.id(), id);
        assert_eq!(app.kind(), "Screen");
        assert!(Arc::ptr_eq(app.supervisor(), &sup));
        assert!(sup.contains(app.handle()).await);
    }

    #[tokio::test]
    async fn test_launch_carries_meta_to_state() {
        let sup = supervisor();
        let meta = AppMeta {
            align: HorizontalAlign::Right,
            dimensions: (120, 40),
            ..AppMeta::default()
        };
        let app = AppBuilder::new("wide", Screen)
            .with_meta(meta.clone())
            .with_supervisor(Arc::clone(&sup))
            .launch_in(&Ambient::lookup_only())
            .await
            .expect("launch");

        assert_eq!(app.meta(), meta);
        let registered = sup.application(app.handle()).await.expect("entry");
        assert_eq!(registered.meta(), meta);
    }

    #[tokio::test]
    async fn test_launch_without_any_supervisor_fails() {
        let err = AppBuilder::new("orphan", Screen)
            .launch_in(&Ambient::lookup_only())
            .await
            .expect_err("no supervisor");
        assert!(matches!(err, SupervisorError::NotFound));
    }

    #[tokio::test]
    async fn test_self_stop_is_swept_by_supervisor() {
        let sup = supervisor();
        let app = AppBuilder::new("screen", Screen)
            .with_supervisor(Arc::clone(&sup))
            .launch_in(&Ambient::lookup_only())
            .await
            .expect("launch");

        app.stop();
        assert!(!app.is_running());
        tokio::time::timeout(Duration::from_secs(1), app.handle().finished())
            .await
            .expect("finished");

        let dead = sup.application_check(None).await;
        assert_eq!(dead.len(), 1);
        sup.remove_application(&dead[0]).await.expect("remove");
        assert!(sup.is_empty().await);
    }
}

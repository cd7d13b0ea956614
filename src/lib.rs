//! # appvisor
//!
//! **Appvisor** supervises a dynamic set of long-running applications (UI screens,
//! background pollers, ...) executed on a bounded worker pool inside a host process.
//!
//! It tracks their liveness, propagates cooperative stop requests, escalates loudly when
//! an application ignores them, and captures uncaught failures for diagnosis.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  AppBuilder  │   │  AppBuilder  │   │  AppBuilder  │
//!     │  (screen)    │   │  (poller)    │   │  (ticker)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ explicit supervisor, or Ambient::get_or_create()
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - Registry   (HandleId → AppState back-reference)                │
//! │  - WorkerPool (fixed-size runtime; entry methods run here)        │
//! │  - Bus        (broadcast of supervision events)                   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ run(state)   │   │ run(state)   │   │ run(state)   │
//!     │ while        │   │ while        │   │ while        │
//!     │ is_running() │   │ is_running() │   │ is_running() │
//!     └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! AppBuilder::launch ──► start_application ──► Handle ──► Registry
//!
//! Supervisor::run():   Idle ──► Running ──► Draining ──► Stopped
//! loop {
//!   ├─► application_check(None)      dead handles; failures logged line by line
//!   ├─► remove_application(handle)   clear flag ─► wait grace ─► escalate (diagnostic)
//!   └─► registry empty? ─► exit
//! }
//! interrupt (SIGINT/SIGTERM/SIGQUIT or Supervisor::interrupt) ─► exit
//! on exit: shutdown() (remove everything) ─► release worker pool
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                       |
//! |-------------------|-------------------------------------------------------------|------------------------------------------|
//! | **Applications**  | Define long-running work with a cooperative running flag.   | [`Application`], [`AppFn`], [`AppState`] |
//! | **Metadata**      | Typed presentation settings, serializable to JSON.          | [`AppMeta`]                              |
//! | **Supervision**   | Register, sweep, remove and drain applications.             | [`Supervisor`], [`Handle`]               |
//! | **Default server**| First-writer-wins ambient supervisor for implicit binding.  | [`Ambient`], [`AppBuilder`]              |
//! | **Events**        | Structured supervision events, including escalation.        | [`Event`], [`EventKind`]                 |
//! | **Errors**        | Typed contract violations and application failures.         | [`SupervisorError`], [`AppError`]        |
//! | **Configuration** | Pool size, grace period, probe timeout, poll interval.      | [`SupervisorConfig`]                     |
//!
//! Diagnostics are emitted with [`tracing`]; install any subscriber to see them.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use appvisor::{Ambient, AppBuilder, AppError, AppFn, AppState, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::named("demo");
//!     cfg.workers = 2;
//!     cfg.catch_signals = false;
//!     let sup = Supervisor::builder(cfg).build()?;
//!
//!     let ticker = AppFn::arc("Ticker", |state: AppState| async move {
//!         let mut ticks = 0u32;
//!         while state.is_running() {
//!             ticks += 1;
//!             if ticks == 3 {
//!                 state.stop();
//!             }
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!         }
//!         Ok::<_, AppError>(())
//!     });
//!
//!     let app = AppBuilder::from_ref("ticker", ticker)
//!         .with_supervisor(Arc::clone(&sup))
//!         .launch_in(&Ambient::lookup_only())
//!         .await?;
//!
//!     // Returns once the ticker stopped itself and was removed.
//!     sup.run().await;
//!     assert!(!app.is_running());
//!     Ok(())
//! }
//! ```

mod apps;
mod core;
mod error;
mod events;

// ---- Public re-exports ----

pub use apps::{
    App, AppBuilder, AppFn, AppMeta, AppRef, AppState, Application, HorizontalAlign, VerticalAlign,
};
pub use crate::core::{
    Ambient, DEFAULT_SERVER_NAME, Handle, HandleId, Supervisor, SupervisorBuilder,
    SupervisorConfig, SupervisorStatus,
};
pub use error::{AppError, SupervisorError};
pub use events::{Event, EventKind};

//! # Application abstractions.
//!
//! This module provides the application-side types:
//! - [`Application`] - trait for implementing long-running, cooperatively stoppable work
//! - [`AppFn`] - function-backed application implementation
//! - [`AppRef`] - shared reference to an application (`Arc<dyn Application>`)
//! - [`AppState`] - identity and running flag shared with the supervisor
//! - [`AppMeta`] - presentation settings carried by the state
//! - [`AppBuilder`] / [`App`] - construction and the registered instance

mod app;
mod app_fn;
mod application;
mod meta;
mod state;

pub use app::{App, AppBuilder};
pub use app_fn::AppFn;
pub use application::{AppRef, Application};
pub use meta::{AppMeta, HorizontalAlign, VerticalAlign};
pub use state::AppState;

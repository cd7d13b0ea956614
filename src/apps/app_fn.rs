//! # Function-backed application (`AppFn`)
//!
//! [`AppFn`] wraps a closure `F: Fn(AppState) -> Fut`, producing the entry future.
//!
//! ## Example
//! ```rust
//! use appvisor::{AppError, AppFn, AppRef, AppState, Application};
//!
//! let app: AppRef = AppFn::arc("ticker", |state: AppState| async move {
//!     while state.is_running() {
//!         state.stopped().await;
//!     }
//!     Ok::<_, AppError>(())
//! });
//! assert_eq!(app.kind(), "ticker");
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::apps::{AppState, Application};
use crate::error::AppError;

/// Function-backed application implementation.
pub struct AppFn<F> {
    kind: &'static str,
    f: F,
}

impl<F> AppFn<F> {
    /// Creates a new function-backed application; `kind` labels it in logs.
    pub fn new(kind: &'static str, f: F) -> Self {
        Self { kind, f }
    }

    /// Creates the application and returns it as a shared handle.
    pub fn arc(kind: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(kind, f))
    }
}

#[async_trait]
impl<F, Fut> Application for AppFn<F>
where
    F: Fn(AppState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn run(&self, state: AppState) -> Result<(), AppError> {
        (self.f)(state).await
    }
}

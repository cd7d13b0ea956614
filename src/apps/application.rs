//! # Application contract.
//!
//! An [`Application`] is a long-running unit of work with a single entry method.
//! The entry method receives the application's [`AppState`] and is expected to loop
//! while [`AppState::is_running`] holds. Returning early is not an error, but the
//! supervisor logs a warning when `run` returns without a stop having been requested.

use std::sync::Arc;

use async_trait::async_trait;

use crate::apps::AppState;
use crate::error::AppError;

/// # Long-running, cooperatively stoppable unit.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use appvisor::{AppError, AppState, Application};
///
/// struct Poller;
///
/// #[async_trait]
/// impl Application for Poller {
///     async fn run(&self, state: AppState) -> Result<(), AppError> {
///         while state.is_running() {
///             // poll something...
///             tokio::time::sleep(Duration::from_millis(100)).await;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// Returns the application's class, used in registration log lines.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Entry method. Runs until the state's running flag is cleared.
    async fn run(&self, state: AppState) -> Result<(), AppError>;
}

/// Shared handle to an application implementation.
pub type AppRef = Arc<dyn Application>;

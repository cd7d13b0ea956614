//! # Example: ambient
//!
//! Launches a single application without declaring a supervisor. The process-wide
//! default is created on demand with autostart enabled, so `launch()` runs the
//! supervision loop and returns once the application has been removed.
//!
//! ## Run
//! ```bash
//! cargo run --example ambient
//! ```

use std::time::Duration;

use appvisor::{Ambient, AppBuilder, AppError, AppFn, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let countdown = AppFn::arc("Countdown", |state: AppState| async move {
        let mut left = 5;
        while state.is_running() {
            tracing::info!("[{}] {left}", state.name());
            left -= 1;
            if left == 0 {
                state.stop();
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok::<_, AppError>(())
    });

    let app = AppBuilder::from_ref("countdown", countdown).launch().await?;

    let sup = Ambient::global().get().expect("default supervisor was created");
    tracing::info!(
        "'{}' finished on '{}' ({:?})",
        app.name(),
        sup.name(),
        sup.status()
    );
    Ok(())
}

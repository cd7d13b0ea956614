//! # Example: ticker
//!
//! Runs three applications on one supervisor and drives the run loop until every
//! application is gone or Ctrl-C is pressed.
//!
//! - `clock` ticks until the supervisor stops it;
//! - `poller` fails after a few polls (its error chain is logged line by line);
//! - `wizard` finishes its steps and stops itself.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example ticker
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use appvisor::{
    Ambient, AppBuilder, AppError, AppFn, AppState, Application, Supervisor, SupervisorConfig,
};
use tracing_subscriber::EnvFilter;

struct Clock;

#[async_trait]
impl Application for Clock {
    fn kind(&self) -> &'static str {
        "Clock"
    }

    async fn run(&self, state: AppState) -> Result<(), AppError> {
        let mut ticks = 0u64;
        while state.is_running() {
            ticks += 1;
            tracing::info!("[{}] tick #{ticks}", state.name());
            tokio::select! {
                _ = state.stopped() => {}
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
            }
        }
        Ok(())
    }
}

fn read_sensor(poll: u32) -> anyhow::Result<u32> {
    if poll >= 3 {
        anyhow::bail!("sensor returned no data");
    }
    Ok(poll * 10)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut cfg = SupervisorConfig::named("ticker-demo");
    cfg.workers = 3;
    let sup = Supervisor::builder(cfg).build()?;
    let ambient = Ambient::lookup_only();

    let clock = AppBuilder::new("clock", Clock)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&ambient)
        .await?;

    let poller = AppFn::arc("Poller", |state: AppState| async move {
        let mut poll = 0;
        while state.is_running() {
            let value = read_sensor(poll).context("polling temperature sensor")?;
            tracing::info!("[{}] value={value}", state.name());
            poll += 1;
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok::<_, AppError>(())
    });
    AppBuilder::from_ref("poller", poller)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&ambient)
        .await?;

    let wizard = AppFn::arc("Wizard", |state: AppState| async move {
        for step in 1..=4 {
            if !state.is_running() {
                break;
            }
            tracing::info!("[{}] step {step}/4", state.name());
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        state.stop();
        Ok::<_, AppError>(())
    });
    AppBuilder::from_ref("wizard", wizard)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&ambient)
        .await?;

    // Stop the clock from outside after a while; the run loop then finds the registry empty.
    let clock_state = clock.state().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        clock_state.stop();
    });

    sup.run().await;
    tracing::info!("supervisor status: {:?}", sup.status());
    Ok(())
}

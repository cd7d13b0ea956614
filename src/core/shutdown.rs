//! # Interrupt sources of the run loop.
//!
//! The run loop drains when either:
//! - the process receives a termination signal (if `catch_signals` is set):
//!   `SIGINT`, `SIGTERM`, `SIGQUIT` on unix, Ctrl-C elsewhere;
//! - [`Supervisor::interrupt`](crate::Supervisor::interrupt) cancels the in-process token.
//!
//! A failure to register OS signal listeners is logged and leaves only the
//! in-process token.

use tokio_util::sync::CancellationToken;

/// Completes when an interrupt arrives from any enabled source.
pub(crate) async fn wait_for_interrupt(token: &CancellationToken, catch_signals: bool) {
    if !catch_signals {
        return token.cancelled().await;
    }

    tokio::select! {
        res = os_signal() => {
            if let Err(err) = res {
                tracing::warn!("Failed to listen for termination signals: {err}");
                token.cancelled().await;
            }
        }
        _ = token.cancelled() => {}
    }
}

#[cfg(unix)]
async fn os_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn os_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

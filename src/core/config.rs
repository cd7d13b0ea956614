//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the centralized settings of one supervisor.
//!
//! ## Sentinel values
//! - `workers = 0` → clamped to one worker thread
//! - `poll_interval = 0s` → clamped to 1ms (the run loop never spins)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Default display name of a supervisor.
pub const DEFAULT_SERVER_NAME: &str = "DS Application Server";

/// Configuration of a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `name`: cosmetic display name used in log lines
/// - `workers`: worker-pool size
/// - `autostart`: enter the run loop on the first registration
/// - `grace`: how long removal waits for an application to stop by itself
/// - `probe_timeout`: bounded wait for a terminal failure per escalation round
/// - `poll_interval`: fallback tick of the run loop (completions wake it earlier)
/// - `bus_capacity`: event bus ring buffer size
/// - `catch_signals`: treat SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows) as an interrupt
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Display name.
    pub name: String,

    /// Number of worker threads in the pool.
    pub workers: usize,

    /// Start the run loop automatically on the first registration.
    ///
    /// The registering call then blocks until the run loop exits.
    pub autostart: bool,

    /// Grace period between the stop request and the first escalation round.
    pub grace: Duration,

    /// Bounded wait for a terminal failure during each escalation round.
    pub probe_timeout: Duration,

    /// Maximum delay between two liveness sweeps.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Listen for OS termination signals while running.
    pub catch_signals: bool,
}

impl SupervisorConfig {
    /// Creates a default configuration with the given display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the worker count clamped to a minimum of 1.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

/// Twice the available processors, minus one.
fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus * 2).saturating_sub(1).max(1)
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `name = "DS Application Server"`
    /// - `workers = 2 * cpus - 1`
    /// - `autostart = false`
    /// - `grace = 3s`, `probe_timeout = 2s`
    /// - `poll_interval = 50ms`
    /// - `bus_capacity = 1024`
    /// - `catch_signals = true`
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            workers: default_workers(),
            autostart: false,
            grace: Duration::from_secs(3),
            probe_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(50),
            bus_capacity: 1024,
            catch_signals: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.name, "DS Application Server");
        assert!(cfg.workers >= 1);
        assert!(!cfg.autostart);
        assert_eq!(cfg.grace, Duration::from_secs(3));
        assert_eq!(cfg.probe_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_sentinels_are_clamped() {
        let cfg = SupervisorConfig {
            workers: 0,
            poll_interval: Duration::ZERO,
            bus_capacity: 0,
            ..SupervisorConfig::named("clamped")
        };
        assert_eq!(cfg.workers_clamped(), 1);
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.name, "clamped");
    }
}

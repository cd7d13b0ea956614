//! Error types used by the appvisor runtime and applications.
//!
//! This module defines two main error enums:
//!
//! - [`SupervisorError`] - contract violations and failures of the supervisor itself.
//!   These are hard failures returned synchronously to the caller.
//! - [`AppError`] - failures raised by an application's entry method. These never reach
//!   the caller of [`Supervisor::start_application`](crate::Supervisor::start_application);
//!   they are captured on the [`Handle`](crate::Handle) and logged by the liveness sweep.
//!
//! Both types provide `as_label` for logs/events.

use uuid::Uuid;

use thiserror::Error;

use crate::core::{HandleId, SupervisorStatus};

/// # Errors produced by the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The handle is not (or no longer) registered with this supervisor.
    #[error("handle {handle} is not registered with this supervisor")]
    UnknownHandle {
        /// Identity of the rejected handle.
        handle: HandleId,
    },

    /// The application state was already registered once; a new instance is required.
    #[error("application '{name}' ({id}) was already registered")]
    AlreadyRegistered {
        /// Display name of the application.
        name: String,
        /// Process-unique identifier of the application.
        id: Uuid,
    },

    /// No supervisor could be located (and none may be created).
    #[error("no application server available")]
    NotFound,

    /// The supervisor is draining or stopped and does not accept new applications.
    #[error("application server '{server}' is {status:?} and does not accept applications")]
    NotAccepting {
        /// Display name of the supervisor.
        server: String,
        /// Status at the time of the call.
        status: SupervisorStatus,
    },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {source}")]
    Pool {
        /// Underlying runtime builder error.
        #[source]
        source: std::io::Error,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use appvisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::NotFound.as_label(), "supervisor_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::UnknownHandle { .. } => "supervisor_unknown_handle",
            SupervisorError::AlreadyRegistered { .. } => "supervisor_already_registered",
            SupervisorError::NotFound => "supervisor_not_found",
            SupervisorError::NotAccepting { .. } => "supervisor_not_accepting",
            SupervisorError::Pool { .. } => "supervisor_pool",
        }
    }
}

/// # Errors produced by an application's entry method.
///
/// `Panicked` is never constructed by user code; the worker pool records it when
/// the entry future unwinds.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AppError {
    /// The application failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The application hit an unrecoverable condition.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The entry method panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// Any other error bubbled up with `?`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Creates an [`AppError::Fail`] from anything displayable.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        AppError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use appvisor::AppError;
    ///
    /// assert_eq!(AppError::fail("boom").as_label(), "app_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AppError::Fail { .. } => "app_failed",
            AppError::Fatal { .. } => "app_fatal",
            AppError::Panicked { .. } => "app_panicked",
            AppError::Other(_) => "app_error",
        }
    }

    /// Renders the failure as a multi-line report: the error itself followed by its cause chain.
    ///
    /// For [`AppError::Other`] this is anyhow's debug report, which also carries a
    /// backtrace when one was captured (`RUST_BACKTRACE=1`).
    pub fn report(&self) -> String {
        if let AppError::Other(err) = self {
            return format!("{err:?}");
        }

        let mut out = format!("{}: {self}", self.as_label());
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\nCaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }

    /// Splits [`report`](Self::report) into discrete log lines.
    ///
    /// Carriage returns are stripped and a trailing empty line is discarded.
    pub fn trace_lines(&self) -> Vec<String> {
        let report = self.report();
        let mut lines: Vec<String> = report
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_report_is_single_line() {
        let err = AppError::fail("connection refused");
        assert_eq!(
            err.trace_lines(),
            vec!["app_failed: execution failed: connection refused".to_string()]
        );
    }

    #[test]
    fn test_other_report_includes_cause_chain() {
        let inner = anyhow::anyhow!("disk full").context("writing frame");
        let err = AppError::from(inner);
        let lines = err.trace_lines();

        assert_eq!(lines[0], "writing frame");
        assert!(lines.iter().any(|l| l.contains("Caused by:")));
        assert!(lines.iter().any(|l| l.contains("disk full")));
        assert!(lines.iter().all(|l| !l.contains('\n')));
    }

    #[test]
    fn test_trailing_empty_line_is_dropped() {
        let err = AppError::Panicked {
            message: "bad state\r\n".into(),
        };
        let lines = err.trace_lines();
        assert_eq!(lines, vec!["app_panicked: panicked: bad state".to_string()]);
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            SupervisorError::UnknownHandle {
                handle: HandleId::from_raw(7)
            }
            .as_label(),
            "supervisor_unknown_handle"
        );
        assert_eq!(
            AppError::Fatal { error: "x".into() }.as_label(),
            "app_fatal"
        );
    }
}

//! Error types used by the harness runtime and virtual users.
//!
//! This module defines two main error enums:
//!
//! - [`UserError`] — faults produced by a virtual user's hooks and task actions.
//! - [`RuntimeError`] — errors raised by the local driver itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Nothing here is fatal to the process: every [`UserError`] is contained to the
//! virtual user that produced it and surfaced via its error hook.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the local driver.
///
/// These represent failures in the orchestration layer itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some user loops were still running.
    #[error("shutdown timeout {grace:?} exceeded; {running} user loop(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of user loops that did not exit in time.
        running: usize,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, running } => {
                format!("grace exceeded after {grace:?}; still running={running}")
            }
        }
    }
}

/// # Faults produced by a virtual user.
///
/// Covers the full taxonomy the runner has to contain: hook and action
/// failures, recovered panics, and the "no task available" selection fault.
///
/// A cycle-limit stop is *not* an error and has no variant here; the runner
/// reports it informationally on the event bus.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserError {
    /// A hook or task action returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A task action (or the loop body) panicked and was recovered at the
    /// isolation boundary.
    #[error("recovered panic: {message}")]
    Panic {
        /// The panic payload, rendered as text.
        message: String,
        /// Backtrace captured at the recovery site.
        trace: String,
    },

    /// The selector returned no task for this iteration.
    #[error("next task not found")]
    NoTask,
}

impl UserError {
    /// Shorthand for [`UserError::Fail`].
    ///
    /// # Example
    /// ```
    /// use stampede::UserError;
    ///
    /// let err = UserError::fail("login rejected");
    /// assert_eq!(err.as_label(), "user_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        UserError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            UserError::Fail { .. } => "user_failed",
            UserError::Panic { .. } => "user_panic",
            UserError::NoTask => "no_task",
        }
    }

    /// Returns a human-readable message with details about the fault.
    ///
    /// For [`UserError::Panic`] this includes the captured backtrace, so the
    /// error hook receives the fault and the trace in one payload.
    pub fn as_message(&self) -> String {
        match self {
            UserError::Fail { error } => format!("error: {error}"),
            UserError::Panic { message, trace } => format!("panic: {message}\n{trace}"),
            UserError::NoTask => "next task not found".to_string(),
        }
    }
}

impl From<String> for UserError {
    fn from(error: String) -> Self {
        UserError::Fail { error }
    }
}

impl From<&str> for UserError {
    fn from(error: &str) -> Self {
        UserError::Fail {
            error: error.to_string(),
        }
    }
}

//! # Diagnostic events emitted by the harness runtime.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **User lifecycle**: one virtual-user loop starting and stopping
//! - **Iteration faults**: action failures, recovered panics, empty selection
//! - **Run control**: cycle limits, skip/interrupt transitions, shutdown flow
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! names, reasons, and cycle counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events from many
//! concurrently running user loops interleave.
//!
//! ## Example
//! ```rust
//! use stampede::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ActionFailed)
//!     .with_task("checkout")
//!     .with_reason("http 502")
//!     .with_cycle(17);
//!
//! assert_eq!(ev.kind, EventKind::ActionFailed);
//! assert_eq!(ev.task.as_deref(), Some("checkout"));
//! assert_eq!(ev.reason.as_deref(), Some("http 502"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of harness events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === User lifecycle ===
    /// A virtual user passed its start hooks and entered the iteration loop.
    ///
    /// Sets: `at`, `seq`.
    UserStarting,

    /// A virtual-user loop exited (any reason) and ran its finish hook.
    ///
    /// Sets: `reason` (exit kind label), `cycle` (executed actions), `at`, `seq`.
    UserStopped,

    /// A user's `on_start` hook failed; the user aborted before its first
    /// iteration and the engine slot was released.
    ///
    /// Sets: `reason`, `at`, `seq`.
    StartFailed,

    // === Iteration faults ===
    /// A task action returned an error for this iteration.
    ///
    /// Sets: `task`, `reason`, `cycle`, `at`, `seq`.
    ActionFailed,

    /// A task action panicked and was recovered at the isolation boundary.
    ///
    /// Sets: `task`, `reason` (panic message), `cycle`, `at`, `seq`.
    ActionPanicked,

    /// The selector returned no task for this iteration.
    ///
    /// Sets: `at`, `seq`.
    NoTaskAvailable,

    // === Run control ===
    /// The configured cycle limit was reached; informational, not an error.
    ///
    /// Sets: `cycle`, `at`, `seq`.
    CycleLimitReached,

    /// A `Skip` status was consumed: one interval sleep omitted, status reset.
    ///
    /// Sets: `cycle`, `at`, `seq`.
    SkipApplied,

    /// Stop was requested on the shared stop signal.
    ///
    /// Sets: `at`, `seq`.
    StopRequested,

    /// All user loops exited within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some user loops were still running.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task involved, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, panic messages, exit labels).
    pub reason: Option<Arc<str>>,
    /// Iteration counter of the emitting user loop at the time of the event.
    pub cycle: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            cycle: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting loop's iteration counter.
    #[inline]
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }
}

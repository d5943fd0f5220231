//! # Worker-engine seams.
//!
//! Two narrow traits decouple the harness from the distributed worker engine:
//!
//! - [`Reporter`] — the engine's success/failure recording surface, injected
//!   through the [`Harness`](crate::Harness) instead of living in global
//!   mutable function variables. Consumed by task actions, never by the
//!   scheduler itself.
//! - [`EngineHandle`] — registration and slot control: the harness registers
//!   one named, weighted entry action with the engine, and releases its
//!   execution slot when a user's `on_start` fails.
//!
//! Both default to no-ops so the crate runs standalone.

use std::sync::Arc;

/// Success/failure recording surface supplied by the worker engine.
pub trait Reporter: Send + Sync {
    /// Records one successful operation.
    fn record_success(&self, category: &str, label: &str, elapsed_ms: u64, size_bytes: u64);

    /// Records one failed operation.
    fn record_failure(&self, category: &str, label: &str, elapsed_ms: u64, reason: &str);
}

/// Reporter that discards everything (the standalone default).
#[derive(Debug, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn record_success(&self, _category: &str, _label: &str, _elapsed_ms: u64, _size_bytes: u64) {}

    fn record_failure(&self, _category: &str, _label: &str, _elapsed_ms: u64, _reason: &str) {}
}

/// Handle to the external worker engine.
pub trait EngineHandle: Send + Sync {
    /// Acknowledges registration of the harness entry action with the engine.
    ///
    /// The engine invokes that action repeatedly and concurrently at whatever
    /// concurrency level it determines.
    fn register(&self, name: &str, weight: i64);

    /// Tells the engine to release this invocation's execution slot.
    ///
    /// Called when a user's `on_start` hook fails and the user aborts before
    /// its first iteration.
    fn release_slot(&self);
}

/// Engine handle that does nothing (the standalone default).
#[derive(Debug, Default)]
pub struct NoopEngine;

impl EngineHandle for NoopEngine {
    fn register(&self, _name: &str, _weight: i64) {}

    fn release_slot(&self) {}
}

/// Shared reporter handle.
pub type ReporterRef = Arc<dyn Reporter>;

/// Shared engine handle.
pub type EngineRef = Arc<dyn EngineHandle>;

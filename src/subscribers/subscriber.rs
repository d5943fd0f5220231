//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging custom event
//! handlers (logging, metrics, assertions in tests) into the harness.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged, never propagated)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for this subscriber only**.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers do not block publishers or each other.

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for harness observability.
///
/// Each subscriber runs in isolation: a bounded queue buffers events, a
/// dedicated worker processes them FIFO, and panics inside the handler are
/// caught without affecting the rest of the runtime.
///
/// ## Example
/// ```rust
/// use async_trait::async_trait;
/// use stampede::{Event, EventKind, Subscribe};
///
/// struct FailureCounter;
///
/// #[async_trait]
/// impl Subscribe for FailureCounter {
///     async fn on_event(&self, ev: &Event) {
///         if matches!(ev.kind, EventKind::ActionFailed) {
///             // increment a counter, export a metric, ...
///         }
///     }
///
///     fn name(&self) -> &'static str { "failure-counter" }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync {
    /// Handles one event. Panics are caught by the worker.
    async fn on_event(&self, ev: &Event);

    /// Short, stable subscriber name used in drop/panic diagnostics.
    fn name(&self) -> &'static str;

    /// Capacity of this subscriber's bounded queue (minimum 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}

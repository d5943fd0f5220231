//! # Weighted, optionally order-prioritized task.
//!
//! [`Task`] bundles an executable [`Action`](crate::tasks::Action) with its
//! static selection weight, an optional one-time execution order, and the
//! selector-owned smooth-round-robin state.
//!
//! ## Rules
//! - `weight > 0` for any task that should ever win the weighted phase.
//! - `order = 0` means unset; `1..N` ranks one-time warm-up executions in
//!   ascending order before weighted selection begins. The order is consumed
//!   (cleared to 0) after the single guaranteed run.
//! - Scheduling state is exclusively owned by the virtual user holding the
//!   task; tasks are never shared across users.

use std::borrow::Cow;

use crate::error::UserError;
use crate::tasks::action::ActionRef;

/// Selector-owned scheduling state for one task.
///
/// Reset at user initialization: `effective = weight`, `current = 0`.
/// `current` accumulates `effective` every weighted round and is debited by
/// the round's weight total when the task wins, so it can go negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SmoothWeight {
    /// Running selection credit.
    pub current: i64,
    /// Per-round increment; equals the static weight after initialization.
    pub effective: i64,
}

/// A named, weighted, optionally order-prioritized unit of work.
#[derive(Clone)]
pub struct Task {
    name: Cow<'static, str>,
    weight: i64,
    order: u32,
    action: ActionRef,
    pub(crate) smooth: SmoothWeight,
}

impl Task {
    /// Creates a task with the given diagnostic name, behavior, and weight.
    pub fn new(name: impl Into<Cow<'static, str>>, action: ActionRef, weight: i64) -> Self {
        Self {
            name: name.into(),
            weight,
            order: 0,
            action,
            smooth: SmoothWeight::default(),
        }
    }

    /// Tags the task with a one-time execution order (`1..N`, ascending).
    ///
    /// `0` leaves the task untagged.
    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Returns the diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the static selection weight.
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Returns the one-time execution order (`0` = unset).
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Consumes the one-time order after its guaranteed run; the task then
    /// participates as an ordinary weighted entry for the rest of the user's
    /// lifetime.
    pub(crate) fn clear_order(&mut self) {
        self.order = 0;
    }

    /// Resets the scheduling state for a fresh user lifetime.
    pub(crate) fn reset_smooth(&mut self) {
        self.smooth = SmoothWeight {
            current: 0,
            effective: self.weight,
        };
    }

    /// Executes the task's action once.
    pub async fn run(&self) -> Result<(), UserError> {
        self.action.call().await
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("order", &self.order)
            .field("smooth", &self.smooth)
            .finish_non_exhaustive()
    }
}

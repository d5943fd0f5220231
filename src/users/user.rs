//! # Virtual-user contract.
//!
//! [`User`] is the capability set every simulated actor exposes to the
//! runner: task-list access, one-time initialization, selection, and the
//! lifecycle hooks (`before_start`, `on_start`, `on_error`, `on_finish`).
//!
//! Most implementations embed [`UserCore`](crate::users::UserCore) for the
//! bookkeeping and override only the hooks they care about; see
//! [`ScriptUser`](crate::users::ScriptUser) for a closure-based ready-made
//! implementation.
//!
//! ## Status capability
//! Status tracking is optional. [`User::status_monitor`] defaults to `None`;
//! the runner then treats the user as permanently `Normal` via the
//! [`Passive`](crate::users::Passive) adapter. Users embedding `UserCore` get
//! a real monitor for free.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UserError;
use crate::tasks::Task;
use crate::users::status::StatusMonitor;

/// Factory producing one fresh virtual user per runner invocation.
///
/// Invoked once per simulated user; the produced object is discarded when its
/// loop exits (no pooling or reuse).
pub type UserFactory = Arc<dyn Fn() -> Box<dyn User> + Send + Sync>;

/// # One simulated independent actor.
///
/// Lifecycle, as driven by the runner:
/// 1. `initialize()` — exactly once, before the first iteration
/// 2. `before_start()` — a returned error is reported but does not abort
/// 3. `on_start()` — a returned error aborts the user after the engine slot
///    is released
/// 4. per iteration: `next()` → execute → status inspection
/// 5. `on_finish()` — exactly once, regardless of exit reason
#[async_trait]
pub trait User: Send {
    /// Relative weight of this user type (defaults to 1 after
    /// initialization). Reserved for future multi-profile mixes; not consumed
    /// by the scheduler today.
    fn weight(&self) -> i64 {
        1
    }

    /// Read access to the task list.
    fn tasks(&self) -> &[Task];

    /// Replaces the task list. Must happen before `initialize()`.
    fn set_tasks(&mut self, tasks: Vec<Task>);

    /// Shuffles the task list, resets every task's scheduling state
    /// (`effective = weight`, `current = 0`), sets status to `Normal`, and
    /// defaults the user weight to 1 if unset. Called exactly once before the
    /// first iteration.
    fn initialize(&mut self);

    /// Picks the next task to run, or `None` if the list is empty.
    fn next(&mut self) -> Option<Task>;

    /// Hook invoked once before `on_start`. A returned error is reported via
    /// [`User::on_error`] but does not abort the user.
    async fn before_start(&mut self) -> Result<(), UserError> {
        Ok(())
    }

    /// Hook invoked once before the loop; typical place for login or other
    /// session setup. A returned error aborts the user's loop after the
    /// worker engine is told to release its execution slot.
    async fn on_start(&mut self) -> Result<(), UserError> {
        Ok(())
    }

    /// Reports a fault. Must never itself fault. The default writes to
    /// stderr.
    fn on_error(&self, operation: &str, error: &UserError) {
        eprintln!("[stampede] {operation} caught error: {error}");
    }

    /// Hook invoked exactly once when the loop exits, regardless of exit
    /// reason.
    fn on_finish(&mut self) {}

    /// Status capability, if this user tracks one.
    ///
    /// `None` (the default) makes the runner treat the user as permanently
    /// `Normal` and discard status changes.
    fn status_monitor(&self) -> Option<&dyn StatusMonitor> {
        None
    }
}

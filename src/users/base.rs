//! # Reusable virtual-user core.
//!
//! [`UserCore`] carries the bookkeeping every user needs: the task list, the
//! atomic status cell, the one-way order-phase flag, and the user weight.
//! Concrete users embed it and delegate the mechanical parts of the
//! [`User`](crate::users::User) trait to it.
//!
//! Initialization shuffles the task list once (randomized start order reduces
//! phase correlation across concurrently running users) using the
//! process-wide thread RNG, which is safe to use from many user loops
//! simultaneously.

use rand::seq::SliceRandom;

use crate::sched::select_next;
use crate::tasks::{ActionRef, Task};
use crate::users::status::{Status, StatusCell, StatusMonitor};

/// Bookkeeping core for a virtual user.
#[derive(Debug, Default)]
pub struct UserCore {
    weight: i64,
    tasks: Vec<Task>,
    status: StatusCell,
    order_phase: bool,
}

impl UserCore {
    /// Creates an empty core with an unset (0) user weight; `initialize`
    /// defaults it to 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a core with an explicit user-type weight.
    pub fn with_weight(weight: i64) -> Self {
        Self {
            weight,
            ..Self::default()
        }
    }

    /// User-type weight (1 after initialization unless set explicitly).
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Read access to the task list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Replaces the task list. Must happen before [`UserCore::initialize`].
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Appends one task.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Appends a weighted task built from an action.
    pub fn add_weighted(
        &mut self,
        name: impl Into<std::borrow::Cow<'static, str>>,
        action: ActionRef,
        weight: i64,
    ) {
        self.tasks.push(Task::new(name, action, weight));
    }

    /// Appends a weighted task with a one-time execution order.
    pub fn add_ordered(
        &mut self,
        name: impl Into<std::borrow::Cow<'static, str>>,
        action: ActionRef,
        weight: i64,
        order: u32,
    ) {
        self.tasks.push(Task::new(name, action, weight).with_order(order));
    }

    /// One-time setup for a fresh lifetime: shuffles the task list, resets
    /// every task's scheduling state, arms the order phase, sets status to
    /// `Normal`, and defaults the user weight to 1 if unset.
    pub fn initialize(&mut self) {
        self.tasks.shuffle(&mut rand::rng());
        for t in &mut self.tasks {
            t.reset_smooth();
        }
        self.order_phase = true;
        self.status.set(Status::Normal);
        if self.weight == 0 {
            self.weight = 1;
        }
    }

    /// Delegates to the selector over this user's tasks and order-phase flag.
    pub fn next(&mut self) -> Option<Task> {
        select_next(&mut self.tasks, &mut self.order_phase)
            .map(|i| self.tasks[i].clone())
    }

    /// Requests termination of this user's loop after the current action.
    ///
    /// Typical use from inside a task action:
    /// ```text
    /// user.interrupt();
    /// return;
    /// ```
    pub fn interrupt(&self) {
        self.status.set(Status::Interrupted);
    }

    /// Skips the current iteration's interval sleep; the runner resets the
    /// status to `Normal` right after consuming it.
    pub fn skip(&self) {
        self.status.set(Status::Skip);
    }

    /// The embedded status monitor.
    pub fn monitor(&self) -> &dyn StatusMonitor {
        &self.status
    }
}

impl StatusMonitor for UserCore {
    fn status(&self) -> Status {
        self.status.get()
    }

    fn set_status(&self, status: Status) {
        self.status.set(status);
    }
}

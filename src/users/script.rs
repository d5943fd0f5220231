//! # Closure-based virtual user.
//!
//! [`ScriptUser`] is a ready-made [`User`](crate::users::User) built on
//! [`UserCore`](crate::users::UserCore) with optional closure hooks, so a
//! scenario can be assembled without defining a new type:
//!
//! ```rust
//! use stampede::{ActionFn, ScriptUser, UserError};
//!
//! let user = ScriptUser::new()
//!     .with_task("browse", ActionFn::arc(|| async { Ok(()) }), 5)
//!     .with_task("buy", ActionFn::arc(|| async { Ok(()) }), 1)
//!     .with_on_start(|| async { Ok::<_, UserError>(()) });
//! ```
//!
//! For users carrying richer per-session state (HTTP clients, credentials),
//! implement `User` directly and embed `UserCore`.

use std::borrow::Cow;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::UserError;
use crate::tasks::{ActionRef, Task};
use crate::users::base::UserCore;
use crate::users::status::StatusMonitor;
use crate::users::user::User;

type Hook = Box<dyn Fn() -> BoxFuture<'static, Result<(), UserError>> + Send + Sync>;

/// A virtual user assembled from tasks and optional closure hooks.
#[derive(Default)]
pub struct ScriptUser {
    core: UserCore,
    before_start: Option<Hook>,
    on_start: Option<Hook>,
}

impl ScriptUser {
    /// Creates an empty script user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script user with an explicit user-type weight.
    pub fn with_weight(weight: i64) -> Self {
        Self {
            core: UserCore::with_weight(weight),
            ..Self::default()
        }
    }

    /// Adds a weighted task.
    #[must_use]
    pub fn with_task(
        mut self,
        name: impl Into<Cow<'static, str>>,
        action: ActionRef,
        weight: i64,
    ) -> Self {
        self.core.add_weighted(name, action, weight);
        self
    }

    /// Adds a weighted task with a one-time execution order.
    #[must_use]
    pub fn with_ordered_task(
        mut self,
        name: impl Into<Cow<'static, str>>,
        action: ActionRef,
        weight: i64,
        order: u32,
    ) -> Self {
        self.core.add_ordered(name, action, weight, order);
        self
    }

    /// Sets the `before_start` hook.
    #[must_use]
    pub fn with_before_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), UserError>> + Send + 'static,
    {
        self.before_start = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Sets the `on_start` hook.
    #[must_use]
    pub fn with_on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), UserError>> + Send + 'static,
    {
        self.on_start = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// The embedded core, for `interrupt()`/`skip()` handles shared with
    /// actions.
    pub fn core(&self) -> &UserCore {
        &self.core
    }
}

#[async_trait]
impl User for ScriptUser {
    fn weight(&self) -> i64 {
        self.core.weight()
    }

    fn tasks(&self) -> &[Task] {
        self.core.tasks()
    }

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.core.set_tasks(tasks);
    }

    fn initialize(&mut self) {
        self.core.initialize();
    }

    fn next(&mut self) -> Option<Task> {
        self.core.next()
    }

    async fn before_start(&mut self) -> Result<(), UserError> {
        match &self.before_start {
            Some(hook) => hook().await,
            None => Ok(()),
        }
    }

    async fn on_start(&mut self) -> Result<(), UserError> {
        match &self.on_start {
            Some(hook) => hook().await,
            None => Ok(()),
        }
    }

    fn status_monitor(&self) -> Option<&dyn StatusMonitor> {
        Some(self.core.monitor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::ActionFn;
    use crate::users::status::Status;

    #[tokio::test]
    async fn test_hooks_default_to_ok() {
        let mut user = ScriptUser::new();
        assert!(user.before_start().await.is_ok());
        assert!(user.on_start().await.is_ok());
    }

    #[tokio::test]
    async fn test_on_start_hook_runs() {
        let mut user = ScriptUser::new().with_on_start(|| async { Err(UserError::fail("auth")) });
        assert!(user.on_start().await.is_err());
    }

    #[test]
    fn test_status_monitor_is_present() {
        let user = ScriptUser::new();
        let monitor = user.status_monitor().expect("script users track status");
        monitor.set_status(Status::Skip);
        assert_eq!(monitor.status(), Status::Skip);
    }

    #[test]
    fn test_builder_collects_tasks() {
        let user = ScriptUser::new()
            .with_task("a", ActionFn::arc(|| async { Ok(()) }), 5)
            .with_ordered_task("b", ActionFn::arc(|| async { Ok(()) }), 1, 1);
        assert_eq!(user.tasks().len(), 2);
        assert_eq!(user.tasks()[1].order(), 1);
    }
}

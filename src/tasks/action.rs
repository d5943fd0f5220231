//! # Task behavior abstraction and function-backed implementation.
//!
//! This module defines the [`Action`] trait (the executable behavior of a
//! [`Task`](crate::tasks::Task), opaque to the scheduler) and a convenient
//! function-backed implementation [`ActionFn`]. The common handle type is
//! [`ActionRef`], an `Arc<dyn Action>` suitable for sharing across the
//! runtime.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UserError;

/// Shared handle to an action (`Arc<dyn Action>`).
pub type ActionRef = Arc<dyn Action>;

/// # Asynchronous unit of work executed by a virtual user.
///
/// An `Action` is invoked once per iteration of the user loop that selected
/// its task. An `Err` is reported through the user's error hook; a panic is
/// recovered at the runner's isolation boundary. Neither aborts the loop.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use stampede::{Action, UserError};
///
/// struct Ping;
///
/// #[async_trait]
/// impl Action for Ping {
///     async fn call(&self) -> Result<(), UserError> {
///         // issue the request, record success/failure via the Reporter...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Executes one iteration of this task's behavior.
    async fn call(&self) -> Result<(), UserError>;
}

/// Function-backed action implementation.
///
/// Wraps a closure that *creates* a new future per call, so no mutable state
/// is shared between iterations; if shared state is needed, move an
/// `Arc<...>` into the closure explicitly.
///
/// ## Example
/// ```rust
/// use stampede::{ActionFn, ActionRef, UserError};
///
/// let ping: ActionRef = ActionFn::arc(|| async {
///     Ok::<_, UserError>(())
/// });
/// ```
pub struct ActionFn<F> {
    f: F,
}

impl<F> ActionFn<F> {
    /// Creates a new function-backed action.
    ///
    /// Prefer [`ActionFn::arc`] when you immediately need an [`ActionRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Action for ActionFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UserError>> + Send + 'static,
{
    async fn call(&self) -> Result<(), UserError> {
        (self.f)().await
    }
}

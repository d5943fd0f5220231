//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Action`] — trait for implementing the async behavior of a task
//! - [`ActionFn`] — function-based action implementation
//! - [`ActionRef`] — shared reference to an action (`Arc<dyn Action>`)
//! - [`Task`] — a named, weighted, optionally order-prioritized unit of work
//! - [`SmoothWeight`] — selector-owned scheduling state

mod action;
mod task;

pub use action::{Action, ActionFn, ActionRef};
pub use task::{SmoothWeight, Task};

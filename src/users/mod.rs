//! # Virtual users.
//!
//! This module provides the virtual-user contract and its building blocks:
//! - [`User`] — the capability set the runner drives (hooks, task list,
//!   selection); [`UserFactory`] produces one fresh user per invocation
//! - [`Status`], [`StatusMonitor`], [`Passive`], [`StatusCell`] — the
//!   three-state status machine and its optional-capability plumbing
//! - [`UserCore`] — reusable bookkeeping base (shuffle-at-init, weight reset,
//!   order phase, status cell)
//! - [`ScriptUser`] — closure-based ready-made user

mod base;
mod script;
mod status;
mod user;

pub use base::UserCore;
pub use script::ScriptUser;
pub use status::{Passive, Status, StatusCell, StatusMonitor};
pub use user::{User, UserFactory};

//! # Task selection.
//!
//! The selection algorithm behind every virtual user's `next()`:
//! [`select_next`] implements smooth weighted round robin with a one-time
//! ascending order-drain phase. Pure over the user-owned task slice; no
//! locking is needed because scheduling state is never shared across users.

mod smooth;

pub use smooth::select_next;

//! # Event subscribers for the harness runtime.
//!
//! Provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out, and the
//! built-in [`LogWriter`] for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   user loops ── publish(Event) ──► Bus ──► harness listener
//!                                               │
//!                                          SubscriberSet::emit(&Event)
//!                                         ┌─────────┼──────────┐
//!                                         ▼         ▼          ▼
//!                                     LogWriter  Metrics    Custom ...
//! ```

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`Harness`], which spawns and winds
//! down the concurrent user loops, plus the two pieces engine adapters need
//! to embed a loop in their own runtime: [`UserRunner`] and [`StopSignal`].
//!
//! Internal modules:
//! - [`runner`]: one virtual user's execution loop (hooks, intervals, cycles,
//!   status, fault containment);
//! - [`harness`]: spawns n loops, registers the entry action, handles OS
//!   signals and shutdown with a grace period;
//! - [`signal`]: the shared stop signal with its two-phase handshake;
//! - [`guard`]: the panic isolation boundary.

pub(crate) mod guard;
mod harness;
mod runner;
mod signal;

pub use harness::Harness;
pub use runner::UserRunner;
pub use signal::StopSignal;

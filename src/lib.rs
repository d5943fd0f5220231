//! # stampede
//!
//! **Stampede** is a load-generation core for Rust: weighted task scheduling,
//! virtual-user lifecycles, and a supervised execution loop per simulated
//! user. The crate is designed as the scheduling heart of a load tool, with
//! narrow seams toward whatever distributed worker engine drives it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!      ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!      │ UserFactory  │───►│  User (trait)│───►│ Task / Action│
//!      │ (one fresh   │    │  hooks +     │    │ name, weight,│
//!      │  user/loop)  │    │  task list   │    │ order        │
//!      └──────┬───────┘    └──────────────┘    └──────────────┘
//!             ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Harness (local driver)                                      │
//! │  - Bus (broadcast events)                                    │
//! │  - StopSignal (two-phase stop: request ─► handshake)         │
//! │  - SubscriberSet (fans out to user subscribers)              │
//! │  - EngineHandle / Reporter (worker-engine seams)             │
//! └─────┬──────────────────┬──────────────────┬─────────────┬────┘
//!       ▼                  ▼                  ▼             │
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//!   │  UserRunner  │   │  UserRunner  │   │  UserRunner  │  │
//!   │ (one user's  │   │ (one user's  │   │ (one user's  │  │
//!   │  loop)       │   │  loop)       │   │  loop)       │  │
//!   └┬─────────────┘   └┬─────────────┘   └┬─────────────┘  │
//!    │ Publishes        │ Publishes        │ Publishes      │
//!    │ - UserStarting   │ - ActionFailed   │ - SkipApplied  │
//!    │ - UserStopped    │ - ActionPanicked │ - ...          │
//!    ▼                  ▼                  ▼                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Bus (broadcast channel)                   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                ▼
//!                     harness event listener
//!                                ▼
//!                         SubscriberSet
//!                    ┌──────────┼──────────┐
//!                    ▼          ▼          ▼
//!                 worker1    worker2    workerN
//!                    ▼          ▼          ▼
//!               sub1.on_   sub2.on_   subN.on_
//!                event()    event()    event()
//! ```
//!
//! ### One user's lifecycle
//! ```text
//! factory() ──► initialize() ──► before_start() ──► on_start()
//!
//! loop {
//!   ├─► stop requested? ──► exit
//!   ├─► next(): order-tagged tasks drain once, ascending; then smooth
//!   │          weighted round robin (exact proportions, no bursts)
//!   ├─► run the action inside the panic isolation boundary
//!   ├─► cycles += 1; cycle limit ──► exit
//!   ├─► status: Interrupted ─► exit │ Skip ─► no sleep │ Normal ─► sleep
//!   └─► sleep(interval)  (adaptive mode deducts the action's runtime)
//! }
//!
//! On exit: on_finish() always; stop-driven exits await the stop handshake;
//! every return is paced by the retry backoff.
//! ```
//!
//! ## Features
//! | Area            | Description                                               | Key types / traits                         |
//! |-----------------|-----------------------------------------------------------|--------------------------------------------|
//! | **Scheduling**  | Smooth weighted selection with one-time ordered warm-ups. | [`Task`], [`SmoothWeight`]                 |
//! | **Users**       | Virtual-user contract, hooks, status machine.             | [`User`], [`ScriptUser`], [`UserCore`]     |
//! | **Execution**   | Per-user loop with intervals, cycles, fault containment.  | [`UserRunner`], [`Harness`], [`StopSignal`]|
//! | **Events**      | Broadcast diagnostics with subscriber fan-out.            | [`Event`], [`Bus`], [`Subscribe`]          |
//! | **Engine seams**| Outcome recording and worker slot control.                | [`Reporter`], [`EngineHandle`]             |
//! | **Errors**      | Typed errors for user loops and the runtime.              | [`UserError`], [`RuntimeError`]            |
//! | **Configuration**| Centralized run settings with duration parsing.          | [`HarnessConfig`], [`parse_duration`]      |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stampede::{ActionFn, Harness, HarnessConfig, ScriptUser, User, UserFactory};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = HarnessConfig::default();
//!     cfg.interval = Duration::from_millis(10);
//!     cfg.max_cycles = 3;
//!     cfg.retry_backoff = Duration::ZERO;
//!
//!     // One fresh user per loop: login drains first, then all three tasks
//!     // rotate by weight (ordered tasks keep a weight for that phase).
//!     let factory: UserFactory = Arc::new(|| {
//!         Box::new(
//!             ScriptUser::new()
//!                 .with_ordered_task("login", ActionFn::arc(|| async { Ok(()) }), 1, 1)
//!                 .with_task("browse", ActionFn::arc(|| async { Ok(()) }), 5)
//!                 .with_task("buy", ActionFn::arc(|| async { Ok(()) }), 1),
//!         ) as Box<dyn User>
//!     });
//!
//!     Harness::new(cfg).run(factory, 2).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod report;
mod sched;
mod subscribers;
mod tasks;
mod users;

// ---- Public re-exports ----

pub use config::{parse_duration, HarnessConfig};
pub use core::{Harness, StopSignal, UserRunner};
pub use error::{RuntimeError, UserError};
pub use events::{Bus, Event, EventKind};
pub use report::{EngineHandle, EngineRef, NoopEngine, NoopReporter, Reporter, ReporterRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Action, ActionFn, ActionRef, SmoothWeight, Task};
pub use users::{
    Passive, ScriptUser, Status, StatusCell, StatusMonitor, User, UserCore, UserFactory,
};

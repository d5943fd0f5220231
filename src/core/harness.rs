//! # Harness: top-level orchestration of concurrent user loops.
//!
//! [`Harness`] wires the shared pieces together and drives a whole run:
//!
//! ```text
//! Harness::run(factory, n)
//!   ├─► register the single entry action with the engine handle
//!   ├─► spawn the event listener (bus ─► SubscriberSet fan-out)
//!   ├─► spawn n UserRunner loops into a JoinSet
//!   └─► wait for the first of:
//!         • every loop exiting on its own (cycle-limited runs)
//!         • a programmatic stop on the shared StopSignal
//!         • an OS shutdown signal (SIGINT / SIGTERM / SIGQUIT)
//!
//! wind-down: request_stop ─► wait up to `grace` for loops to drain
//!   ├─► drained: AllStoppedWithin, Ok(())
//!   └─► exceeded: GraceExceeded, abort stragglers, Err(GraceExceeded)
//! ```
//!
//! The stop signal raises both the stop and the handshake token, so loops
//! blocked in the stop handshake are released immediately. Engines that
//! sequence their own teardown use [`StopSignal::publish`] and
//! [`StopSignal::complete`] directly instead of `request_stop`.

use std::borrow::Cow;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::HarnessConfig;
use crate::core::runner::UserRunner;
use crate::core::signal::StopSignal;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::report::{EngineRef, NoopEngine, NoopReporter, ReporterRef};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::users::UserFactory;

/// Orchestrates a fleet of virtual-user loops over one shared bus, stop
/// signal, and engine handle.
///
/// Cheap to clone; clones share the same bus and stop signal, so a clone can
/// be moved into a spawned task while the original keeps control.
#[derive(Clone)]
pub struct Harness {
    cfg: HarnessConfig,
    bus: Bus,
    signal: Arc<StopSignal>,
    engine: EngineRef,
    reporter: ReporterRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
    entry_name: Cow<'static, str>,
    entry_weight: i64,
}

impl Harness {
    /// Creates a harness with the given configuration, a no-op engine handle,
    /// and no subscribers.
    pub fn new(cfg: HarnessConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            signal: Arc::new(StopSignal::new()),
            engine: Arc::new(NoopEngine),
            reporter: Arc::new(NoopReporter),
            subscribers: Vec::new(),
            entry_name: Cow::Borrowed("stampede"),
            entry_weight: 1,
        }
    }

    /// Names the single entry action announced to the worker engine, with
    /// the user-type weight the engine should attach to it.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<Cow<'static, str>>, weight: i64) -> Self {
        self.entry_name = name.into();
        self.entry_weight = weight;
        self
    }

    /// Replaces the engine handle used for task registration and slot
    /// release.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineRef) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the reporter task actions record their outcomes through.
    #[must_use]
    pub fn with_reporter(mut self, reporter: ReporterRef) -> Self {
        self.reporter = reporter;
        self
    }

    /// The injected reporter, for scenario builders to hand to their task
    /// actions. The scheduler itself never records through it.
    pub fn reporter(&self) -> ReporterRef {
        Arc::clone(&self.reporter)
    }

    /// Attaches a subscriber; it receives every event published during
    /// [`Harness::run`].
    #[must_use]
    pub fn with_subscriber(mut self, sub: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(sub);
        self
    }

    /// The shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The shared stop signal, for programmatic shutdown.
    pub fn signal(&self) -> Arc<StopSignal> {
        Arc::clone(&self.signal)
    }

    /// Drives exactly one virtual user to completion, without the fleet
    /// machinery. Useful for scenario smoke runs and engine adapters that
    /// manage their own concurrency.
    pub async fn drive_one(&self, factory: &UserFactory) {
        self.runner().drive(factory).await;
    }

    /// Runs `users` concurrent virtual-user loops until they drain on their
    /// own, the stop signal is raised, or an OS shutdown signal arrives.
    ///
    /// Returns `Err(RuntimeError::GraceExceeded)` when a stop was requested
    /// and some loops were still running after the grace period; their tasks
    /// are aborted before returning.
    pub async fn run(&self, factory: UserFactory, users: usize) -> Result<(), RuntimeError> {
        // one named entry per scenario; the engine invokes it at whatever
        // concurrency it determines
        self.engine.register(&self.entry_name, self.entry_weight);

        let flush = CancellationToken::new();
        let listener = self.spawn_listener(flush.clone());

        let runner = self.runner();
        let mut workers = JoinSet::new();
        for _ in 0..users {
            let runner = runner.clone();
            let factory = Arc::clone(&factory);
            workers.spawn(async move { runner.drive(&factory).await });
        }

        let stopped = tokio::select! {
            _ = drain_all(&mut workers) => false,
            _ = self.signal.requested() => true,
            _ = os_shutdown() => true,
        };

        let result = if stopped {
            self.wind_down(&mut workers).await
        } else {
            Ok(())
        };

        flush.cancel();
        let _ = listener.await;
        result
    }

    fn runner(&self) -> UserRunner {
        UserRunner::new(
            self.cfg.clone(),
            self.bus.clone(),
            Arc::clone(&self.signal),
            Arc::clone(&self.engine),
        )
    }

    /// Hands the bus over to the subscriber fan-out; the returned handle
    /// completes once `flush` has fired and the buffered backlog is
    /// delivered.
    fn spawn_listener(&self, flush: CancellationToken) -> tokio::task::JoinHandle<()> {
        SubscriberSet::new(self.subscribers.clone()).listen(self.bus.subscribe(), flush)
    }

    async fn wind_down(&self, workers: &mut JoinSet<()>) -> Result<(), RuntimeError> {
        self.signal.request_stop();
        self.bus.publish(Event::new(EventKind::StopRequested));

        match time::timeout(self.cfg.grace, drain_all(workers)).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let running = workers.len();
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                workers.abort_all();
                while workers.join_next().await.is_some() {}
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    running,
                })
            }
        }
    }
}

async fn drain_all(workers: &mut JoinSet<()>) {
    while workers.join_next().await.is_some() {}
}

/// Completes when the process receives a termination signal: `SIGINT`,
/// `SIGTERM`, or `SIGQUIT` (Ctrl-C on non-unix platforms).
///
/// Degraded to "never" when listener registration fails, so a broken signal
/// setup cannot stop a run on its own.
#[cfg(unix)]
async fn os_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let listeners = (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
        signal(SignalKind::quit()),
    );
    match listeners {
        (Ok(mut interrupt), Ok(mut terminate), Ok(mut quit)) => {
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
                _ = quit.recv() => {}
            }
        }
        _ => {
            eprintln!("[stampede] OS signal listeners unavailable; signal shutdown disabled");
            futures::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn os_shutdown() {
    if tokio::signal::ctrl_c().await.is_err() {
        eprintln!("[stampede] OS signal listener unavailable; signal shutdown disabled");
        futures::future::pending::<()>().await;
    }
}

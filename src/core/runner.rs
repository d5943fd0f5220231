//! # UserRunner: one virtual user's full execution loop.
//!
//! One [`UserRunner::drive`] invocation = one virtual user's lifetime. The
//! runner owns the hook sequence, the interval/cycle policy, the status
//! machine, fault containment, and the teardown ordering.
//!
//! ## Loop
//! ```text
//! factory() ─► initialize() ─► before_start() ─► on_start()
//!
//! loop {
//!   ├─► non-blocking stop check ──► exit (stopped)
//!   ├─► next() ── none ──► report NoTaskAvailable, continue (no sleep, no cycle)
//!   ├─► run action inside the isolation boundary
//!   ├─► cycles += 1; limit reached ──► status Interrupted, exit (cycle_limit)
//!   ├─► status: Interrupted ─► exit │ Skip ─► reset, continue │ Normal ─► fall through
//!   └─► sleep(interval) (adaptive: minus action runtime, clamped at zero)
//! }
//!
//! On exit (any reason):
//!   ├─► on_finish()
//!   ├─► stopped-by-signal only: await the stop handshake
//!   └─► sleep(retry_backoff) before returning
//! ```
//!
//! ## Rules
//! - Task executions within one user are strictly sequential.
//! - A fault inside an action is recovered, reported via `on_error` with the
//!   captured trace, and the loop proceeds to its normal per-iteration
//!   teardown.
//! - The whole loop body runs under the isolation boundary too; recovery
//!   never skips `on_finish`, the handshake wait, or the backoff pause.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::HarnessConfig;
use crate::core::guard::isolate;
use crate::core::signal::StopSignal;
use crate::error::UserError;
use crate::events::{Bus, Event, EventKind};
use crate::report::EngineRef;
use crate::users::{Passive, Status, User, UserFactory};

/// Why a user loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exit {
    /// External stop signal observed.
    Stopped,
    /// Status flipped to `Interrupted` by the user or an action.
    Interrupted,
    /// Configured cycle limit reached.
    CycleLimit,
    /// `on_start` failed; the user never entered the loop.
    StartFailed,
    /// The loop body itself panicked and was recovered.
    Fault,
}

impl Exit {
    fn label(self) -> &'static str {
        match self {
            Exit::Stopped => "stopped",
            Exit::Interrupted => "interrupted",
            Exit::CycleLimit => "cycle_limit",
            Exit::StartFailed => "start_failed",
            Exit::Fault => "fault",
        }
    }
}

/// Drives one virtual user's lifetime per [`UserRunner::drive`] call.
///
/// Cheap to clone; the local driver spawns one clone per concurrent user.
#[derive(Clone)]
pub struct UserRunner {
    cfg: HarnessConfig,
    bus: Bus,
    signal: Arc<StopSignal>,
    engine: EngineRef,
}

impl UserRunner {
    /// Creates a runner bound to the shared bus, stop signal, and engine.
    pub fn new(cfg: HarnessConfig, bus: Bus, signal: Arc<StopSignal>, engine: EngineRef) -> Self {
        Self {
            cfg,
            bus,
            signal,
            engine,
        }
    }

    /// Runs one virtual user from construction to teardown.
    ///
    /// Never panics outward: the loop body runs under the isolation
    /// boundary, and every exit path runs `on_finish`, the stop handshake
    /// (stop-driven exits only), and the retry-backoff pause.
    pub async fn drive(&self, factory: &UserFactory) {
        let mut slot: Option<Box<dyn User>> = None;
        let mut cycles: u64 = 0;

        let outcome = isolate(self.run_user(&mut slot, factory, &mut cycles)).await;
        let exit = match outcome {
            Ok(exit) => exit,
            Err(err) => {
                if let UserError::Panic { message, trace } = &err {
                    eprintln!("{message}");
                    eprintln!("{trace}");
                }
                self.bus.publish(
                    Event::new(EventKind::ActionPanicked)
                        .with_reason(err.as_message())
                        .with_cycle(cycles),
                );
                if let Some(user) = slot.as_ref() {
                    user.on_error("run panic", &err);
                }
                Exit::Fault
            }
        };

        if let Some(user) = slot.as_mut() {
            user.on_finish();
        }
        self.bus.publish(
            Event::new(EventKind::UserStopped)
                .with_reason(exit.label())
                .with_cycle(cycles),
        );

        if exit == Exit::Stopped {
            self.signal.handshake().await;
        }

        // paces engine re-invocation after any return, abrupt or clean
        time::sleep(self.cfg.retry_backoff).await;
    }

    async fn run_user(
        &self,
        slot: &mut Option<Box<dyn User>>,
        factory: &UserFactory,
        cycles: &mut u64,
    ) -> Exit {
        let user = slot.insert(factory());
        user.initialize();

        if let Err(err) = user.before_start().await {
            // reported only; the user still proceeds to on_start
            user.on_error("before_start", &err);
        }

        if let Err(err) = user.on_start().await {
            user.on_error("on_start", &err);
            self.bus
                .publish(Event::new(EventKind::StartFailed).with_reason(err.as_message()));
            self.engine.release_slot();
            return Exit::StartFailed;
        }

        self.bus.publish(Event::new(EventKind::UserStarting));

        loop {
            let started = Instant::now();

            if self.signal.is_requested() {
                return Exit::Stopped;
            }

            let Some(task) = user.next() else {
                self.bus.publish(Event::new(EventKind::NoTaskAvailable));
                user.on_error("next_task", &UserError::NoTask);
                // no sleep and no cycle for an empty selection; yield keeps
                // the loop cooperative on a current-thread runtime
                tokio::task::yield_now().await;
                continue;
            };

            match isolate(task.run()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.bus.publish(
                        Event::new(EventKind::ActionFailed)
                            .with_task(task.name())
                            .with_reason(err.as_message())
                            .with_cycle(*cycles + 1),
                    );
                    user.on_error(task.name(), &err);
                }
                Err(err) => {
                    if let UserError::Panic { message, trace } = &err {
                        eprintln!("{message}");
                        eprintln!("{trace}");
                    }
                    self.bus.publish(
                        Event::new(EventKind::ActionPanicked)
                            .with_task(task.name())
                            .with_reason(err.as_message())
                            .with_cycle(*cycles + 1),
                    );
                    user.on_error("run panic", &err);
                }
            }
            *cycles += 1;

            if let Some(limit) = self.cfg.cycle_limit() {
                if *cycles >= limit {
                    self.bus
                        .publish(Event::new(EventKind::CycleLimitReached).with_cycle(*cycles));
                    set_status(&**user, Status::Interrupted);
                    return Exit::CycleLimit;
                }
            }

            match status_of(&**user) {
                Status::Interrupted => return Exit::Interrupted,
                Status::Skip => {
                    set_status(&**user, Status::Normal);
                    self.bus
                        .publish(Event::new(EventKind::SkipApplied).with_cycle(*cycles));
                    continue;
                }
                Status::Normal => {}
            }

            let pause = self.iteration_pause(started);
            if pause > Duration::ZERO {
                time::sleep(pause).await;
            }
        }
    }

    /// The iteration's target pause: the configured interval, minus the time
    /// this iteration already consumed when the adaptive mode is on.
    fn iteration_pause(&self, started: Instant) -> Duration {
        if self.cfg.adaptive_interval {
            self.cfg.interval.saturating_sub(started.elapsed())
        } else {
            self.cfg.interval
        }
    }
}

/// Status via the capability accessor, with the `Passive` adapter as the
/// fallback for users that do not track one.
fn status_of(user: &dyn User) -> Status {
    user.status_monitor().unwrap_or(&Passive).status()
}

fn set_status(user: &dyn User, status: Status) {
    user.status_monitor().unwrap_or(&Passive).set_status(status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{EngineHandle, NoopEngine};
    use crate::sched::select_next;
    use crate::tasks::{ActionFn, Task};
    use crate::users::StatusCell;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Test double: a user with hand-wired tasks, shared spies for error and
    /// finish hooks, and hook outcomes controlled per test.
    struct SpyUser {
        tasks: Vec<Task>,
        order_phase: bool,
        cell: Arc<StatusCell>,
        errors: Arc<Mutex<Vec<(String, &'static str)>>>,
        finishes: Arc<AtomicUsize>,
        before_start_fails: bool,
        on_start_fails: bool,
    }

    #[async_trait]
    impl User for SpyUser {
        fn tasks(&self) -> &[Task] {
            &self.tasks
        }

        fn set_tasks(&mut self, tasks: Vec<Task>) {
            self.tasks = tasks;
        }

        fn initialize(&mut self) {
            for t in &mut self.tasks {
                t.reset_smooth();
            }
            self.order_phase = true;
            self.cell.set(Status::Normal);
        }

        fn next(&mut self) -> Option<Task> {
            select_next(&mut self.tasks, &mut self.order_phase).map(|i| self.tasks[i].clone())
        }

        async fn before_start(&mut self) -> Result<(), UserError> {
            if self.before_start_fails {
                Err(UserError::fail("before_start refused"))
            } else {
                Ok(())
            }
        }

        async fn on_start(&mut self) -> Result<(), UserError> {
            if self.on_start_fails {
                Err(UserError::fail("login refused"))
            } else {
                Ok(())
            }
        }

        fn on_error(&self, operation: &str, error: &UserError) {
            self.errors
                .lock()
                .unwrap()
                .push((operation.to_string(), error.as_label()));
        }

        fn on_finish(&mut self) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }

        fn status_monitor(&self) -> Option<&dyn crate::users::StatusMonitor> {
            Some(&*self.cell)
        }
    }

    struct Spies {
        cell: Arc<StatusCell>,
        errors: Arc<Mutex<Vec<(String, &'static str)>>>,
        finishes: Arc<AtomicUsize>,
    }

    impl Spies {
        fn new() -> Self {
            Self {
                cell: Arc::new(StatusCell::new()),
                errors: Arc::new(Mutex::new(Vec::new())),
                finishes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn factory(&self, tasks: Vec<Task>) -> UserFactory {
            self.factory_with(tasks, false, false)
        }

        fn factory_with(
            &self,
            tasks: Vec<Task>,
            before_start_fails: bool,
            on_start_fails: bool,
        ) -> UserFactory {
            let cell = self.cell.clone();
            let errors = self.errors.clone();
            let finishes = self.finishes.clone();
            let proto = Arc::new(Mutex::new(Some(tasks)));
            Arc::new(move || {
                let tasks = proto.lock().unwrap().take().expect("single-user factory");
                Box::new(SpyUser {
                    tasks,
                    order_phase: true,
                    cell: cell.clone(),
                    errors: errors.clone(),
                    finishes: finishes.clone(),
                    before_start_fails,
                    on_start_fails,
                }) as Box<dyn User>
            })
        }
    }

    fn runner(cfg: HarnessConfig) -> (UserRunner, Bus, Arc<StopSignal>) {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let signal = Arc::new(StopSignal::new());
        let r = UserRunner::new(cfg, bus.clone(), signal.clone(), Arc::new(NoopEngine));
        (r, bus, signal)
    }

    fn counting_task(name: &'static str, weight: i64, hits: Arc<AtomicUsize>) -> Task {
        Task::new(
            name,
            ActionFn::arc(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
            weight,
        )
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        use tokio::sync::broadcast::error::TryRecvError;

        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        out
    }

    fn test_cfg() -> HarnessConfig {
        HarnessConfig {
            retry_backoff: Duration::ZERO,
            ..HarnessConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_cycles_executes_exactly_three_actions() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 3;
        cfg.interval = Duration::from_millis(10);
        let (r, bus, _sig) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let factory = spies.factory(vec![counting_task("t", 1, hits.clone())]);

        r.drive(&factory).await;

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(spies.finishes.load(Ordering::SeqCst), 1);
        assert_eq!(spies.cell.get(), Status::Interrupted);

        let events = drain(&mut rx);
        let limit = events
            .iter()
            .find(|e| e.kind == EventKind::CycleLimitReached)
            .expect("cycle limit event");
        assert_eq!(limit.cycle, Some(3));
        let stopped = events
            .iter()
            .find(|e| e.kind == EventKind::UserStopped)
            .expect("stopped event");
        assert_eq!(stopped.reason.as_deref(), Some("cycle_limit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_omits_exactly_one_sleep_and_resets_status() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 2;
        cfg.interval = Duration::from_secs(3600);
        let (r, bus, _sig) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let cell = spies.cell.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let skip_once = Task::new(
            "skip-once",
            ActionFn::arc(move || {
                let cell = cell.clone();
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        cell.set(Status::Skip);
                    }
                    Ok(())
                }
            }),
            1,
        );
        let factory = spies.factory(vec![skip_once]);

        let before = Instant::now();
        r.drive(&factory).await;

        // both iterations ran without a single interval sleep: the first was
        // skipped, the second hit the cycle limit
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(before.elapsed(), Duration::ZERO);

        let events = drain(&mut rx);
        let skips: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::SkipApplied)
            .collect();
        assert_eq!(skips.len(), 1);
        assert_eq!(skips[0].cycle, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_terminates_without_further_tasks() {
        let mut cfg = test_cfg();
        cfg.interval = Duration::ZERO;
        let (r, bus, _sig) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let cell = spies.cell.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let interrupting = Task::new(
            "interrupt-on-second",
            ActionFn::arc(move || {
                let cell = cell.clone();
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 1 {
                        cell.set(Status::Interrupted);
                    }
                    Ok(())
                }
            }),
            1,
        );
        let factory = spies.factory(vec![interrupting]);

        r.drive(&factory).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(spies.finishes.load(Ordering::SeqCst), 1);

        let events = drain(&mut rx);
        let stopped = events
            .iter()
            .find(|e| e.kind == EventKind::UserStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("interrupted"));
        assert_eq!(stopped.cycle, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_panic_is_contained_and_reported_once() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 2;
        cfg.interval = Duration::from_millis(1);
        let (r, bus, _sig) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let flaky = Task::new(
            "flaky",
            ActionFn::arc(move || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        panic!("simulated action crash");
                    }
                    Ok(())
                }
            }),
            1,
        );
        let factory = spies.factory(vec![flaky]);

        r.drive(&factory).await;

        // loop survived the panic and completed its second cycle
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(spies.finishes.load(Ordering::SeqCst), 1);

        let errors = spies.errors.lock().unwrap();
        let panics: Vec<_> = errors.iter().filter(|(_, l)| *l == "user_panic").collect();
        assert_eq!(panics.len(), 1);
        assert_eq!(panics[0].0, "run panic");

        let events = drain(&mut rx);
        let panicked: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::ActionPanicked)
            .collect();
        assert_eq!(panicked.len(), 1);
        assert!(panicked[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("simulated action crash"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_start_error_does_not_abort() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 1;
        let (r, _bus, _sig) = runner(cfg);

        let spies = Spies::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let factory =
            spies.factory_with(vec![counting_task("t", 1, hits.clone())], true, false);

        r.drive(&factory).await;

        // the error is reported, yet the user still started and iterated
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let errors = spies.errors.lock().unwrap();
        assert!(errors
            .iter()
            .any(|(op, l)| op == "before_start" && *l == "user_failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_start_error_aborts_and_releases_slot() {
        struct ReleaseSpy(Arc<AtomicBool>);

        impl EngineHandle for ReleaseSpy {
            fn register(&self, _name: &str, _weight: i64) {}
            fn release_slot(&self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let released = Arc::new(AtomicBool::new(false));
        let cfg = test_cfg();
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let signal = Arc::new(StopSignal::new());
        let r = UserRunner::new(
            cfg,
            bus.clone(),
            signal,
            Arc::new(ReleaseSpy(released.clone())),
        );
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let factory = spies.factory_with(vec![counting_task("t", 1, hits.clone())], false, true);

        r.drive(&factory).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(spies.finishes.load(Ordering::SeqCst), 1);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| e.kind == EventKind::StartFailed));
        let stopped = events
            .iter()
            .find(|e| e.kind == EventKind::UserStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("start_failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_signal_exits_loop_after_current_action() {
        let mut cfg = test_cfg();
        cfg.interval = Duration::from_secs(1);
        let (r, bus, signal) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let factory = spies.factory(vec![counting_task("t", 1, hits.clone())]);

        let handle = tokio::spawn(async move { r.drive(&factory).await });

        // wait for the loop to actually start, then raise the signal
        loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == EventKind::UserStarting {
                break;
            }
        }
        signal.request_stop();
        handle.await.unwrap();

        assert!(hits.load(Ordering::SeqCst) >= 1);
        assert_eq!(spies.finishes.load(Ordering::SeqCst), 1);

        let events = drain(&mut rx);
        let stopped = events
            .iter()
            .find(|e| e.kind == EventKind::UserStopped)
            .unwrap();
        assert_eq!(stopped.reason.as_deref(), Some("stopped"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_task_reports_and_continues_without_cycles() {
        let cfg = test_cfg();
        let (r, bus, signal) = runner(cfg);
        let mut rx = bus.subscribe();

        let spies = Spies::new();
        let factory = spies.factory(Vec::new());
        let errors = spies.errors.clone();

        let handle = tokio::spawn(async move { r.drive(&factory).await });

        while errors.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }
        signal.request_stop();
        handle.await.unwrap();

        assert!(errors
            .lock()
            .unwrap()
            .iter()
            .all(|(op, l)| op == "next_task" && *l == "no_task"));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| e.kind == EventKind::NoTaskAvailable));
        let stopped = events
            .iter()
            .find(|e| e.kind == EventKind::UserStopped)
            .unwrap();
        assert_eq!(stopped.cycle, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_adaptive_interval_subtracts_action_runtime() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 2;
        cfg.interval = Duration::from_secs(1);
        cfg.adaptive_interval = true;
        let (r, _bus, _sig) = runner(cfg);

        let spies = Spies::new();
        let slow = Task::new(
            "slow",
            ActionFn::arc(|| async {
                time::sleep(Duration::from_millis(300)).await;
                Ok(())
            }),
            1,
        );
        let factory = spies.factory(vec![slow]);

        let before = Instant::now();
        r.drive(&factory).await;

        // iteration 1: 300ms action + 700ms remainder; iteration 2: 300ms
        // action, then the cycle limit exits before any sleep
        assert_eq!(before.elapsed(), Duration::from_millis(1300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_interval_sleeps_full_duration() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 2;
        cfg.interval = Duration::from_secs(1);
        let (r, _bus, _sig) = runner(cfg);

        let spies = Spies::new();
        let slow = Task::new(
            "slow",
            ActionFn::arc(|| async {
                time::sleep(Duration::from_millis(300)).await;
                Ok(())
            }),
            1,
        );
        let factory = spies.factory(vec![slow]);

        let before = Instant::now();
        r.drive(&factory).await;

        assert_eq!(before.elapsed(), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_backoff_paces_every_return() {
        let mut cfg = test_cfg();
        cfg.max_cycles = 1;
        cfg.interval = Duration::ZERO;
        cfg.retry_backoff = Duration::from_secs(2);
        let (r, _bus, _sig) = runner(cfg);

        let spies = Spies::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let factory = spies.factory(vec![counting_task("t", 1, hits.clone())]);

        let before = Instant::now();
        r.drive(&factory).await;

        assert_eq!(before.elapsed(), Duration::from_secs(2));
    }
}

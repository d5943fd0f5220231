//! # Global harness configuration.
//!
//! Provides [`HarnessConfig`], the immutable-after-construction options bag
//! consumed by the user runner and the local driver.
//!
//! ## Sentinel values
//! - `max_cycles = 0` → unlimited iterations (no cycle limit)
//! - `interval = 0s` → no pause between iterations
//!
//! Interval-style fields accept duration strings (`"1s"`, `"100ms"`, `"1m"`);
//! an unparseable string leaves the field unchanged, so a bad flag value falls
//! back to the previous (or default) setting instead of aborting the run.

use std::time::Duration;

/// Configuration for one harness instance.
///
/// Defines:
/// - **Pacing**: static or workload-adaptive interval between task executions
/// - **Bounds**: maximum iteration cycles per virtual user
/// - **Teardown**: retry backoff after a user loop returns, shutdown grace
/// - **Event system**: bus capacity for diagnostic event delivery
///
/// ## Field semantics
/// - `interval`: target pause between iterations (`0s` = none)
/// - `adaptive_interval`: subtract action runtime from the pause, clamped at zero
/// - `max_cycles`: stop the user after this many executed actions (`0` = unlimited)
/// - `retry_backoff`: unconditional pause before a user-loop invocation returns,
///   pacing how quickly the worker engine may re-invoke it (default 2s)
/// - `grace`: maximum wait for user loops to drain during shutdown
/// - `bus_capacity`: diagnostic bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Target pause between loop iterations.
    pub interval: Duration,

    /// When enabled, the pause is `interval` minus the time the action took.
    ///
    /// ```text
    /// |--------------- interval ------------------------------|
    /// |--- action running time ---|--- remaining sleep time ---|
    /// ```
    ///
    /// If the action ran longer than `interval`, no sleep occurs.
    pub adaptive_interval: bool,

    /// Maximum number of executed actions per virtual user.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = the loop stops (status `Interrupted`) after `n` executions
    pub max_cycles: u64,

    /// Unconditional pause before a user-loop invocation returns.
    ///
    /// Applies to every exit path (normal stop, cycle limit, interrupt, start
    /// failure), pacing engine re-invocation after abrupt returns.
    pub retry_backoff: Duration,

    /// Maximum time to wait for user loops to exit during shutdown.
    pub grace: Duration,

    /// Capacity of the diagnostic event bus ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,
}

impl HarnessConfig {
    /// Returns the cycle limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → stop after `n` executed actions
    #[inline]
    pub fn cycle_limit(&self) -> Option<u64> {
        if self.max_cycles == 0 {
            None
        } else {
            Some(self.max_cycles)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Sets the iteration interval from a duration string (`"1s"`, `"100ms"`).
    ///
    /// An unparseable string leaves the current value unchanged.
    pub fn set_interval(&mut self, interval: &str) {
        if let Some(d) = parse_duration(interval) {
            self.interval = d;
        }
    }

    /// Sets the retry backoff from a duration string.
    ///
    /// An unparseable string leaves the current value unchanged.
    pub fn set_retry_backoff(&mut self, backoff: &str) {
        if let Some(d) = parse_duration(backoff) {
            self.retry_backoff = d;
        }
    }
}

impl Default for HarnessConfig {
    /// Default configuration:
    ///
    /// - `interval = 1s`
    /// - `adaptive_interval = false`
    /// - `max_cycles = 0` (unlimited)
    /// - `retry_backoff = 2s`
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            adaptive_interval: false,
            max_cycles: 0,
            retry_backoff: Duration::from_secs(2),
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

/// Parses a compound duration string such as `"1s"`, `"100ms"`, `"1m30s"`,
/// or `"1.5s"`.
///
/// Supported units: `ms`, `s`, `m`, `h`. Returns `None` for empty input,
/// unknown units, or trailing garbage.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use stampede::parse_duration;
///
/// assert_eq!(parse_duration("100ms"), Some(Duration::from_millis(100)));
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("five"), None);
/// ```
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let value: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let (unit_len, per_unit) = if rest.starts_with("ms") {
            (2, Duration::from_millis(1))
        } else if rest.starts_with('s') {
            (1, Duration::from_secs(1))
        } else if rest.starts_with('m') {
            (1, Duration::from_secs(60))
        } else if rest.starts_with('h') {
            (1, Duration::from_secs(3600))
        } else {
            return None;
        };
        rest = &rest[unit_len..];

        // rejects NaN, infinities from oversized literals, and products or
        // sums that exceed Duration's range
        let piece = Duration::try_from_secs_f64(per_unit.as_secs_f64() * value).ok()?;
        total = total.checked_add(piece)?;
    }
    Some(total)
}

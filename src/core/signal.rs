//! # One-shot broadcast stop signal.
//!
//! [`StopSignal`] is the condition that asks all running user loops to end.
//! Every loop subscribes independently; the publish side is guarded by an
//! atomic `running → stopping` transition so the signal observably fires
//! exactly once no matter how many times the underlying notification is
//! requested.
//!
//! ## Handshake
//! Besides the stop notification itself, the signal carries a completion
//! handshake the publisher can be awaited on: a loop that exits because of
//! the stop signal blocks on [`StopSignal::handshake`] before returning, so
//! teardown ordering with whatever raised the signal stays clean.
//! [`StopSignal::request_stop`] publishes and completes in one step; an
//! engine that needs to sequence the two can use [`StopSignal::publish`] and
//! [`StopSignal::complete`] separately.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

const RUNNING: u8 = 0;
const STOPPING: u8 = 1;

/// Broadcast, one-shot stop condition with a completion handshake.
#[derive(Debug)]
pub struct StopSignal {
    state: AtomicU8,
    stop: CancellationToken,
    done: CancellationToken,
}

impl StopSignal {
    /// Creates a signal in the running state.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            stop: CancellationToken::new(),
            done: CancellationToken::new(),
        }
    }

    /// Requests stop: publishes the notification and completes the handshake.
    ///
    /// Idempotent; returns `true` only for the call that performed the
    /// `running → stopping` transition.
    pub fn request_stop(&self) -> bool {
        let won = self.transition();
        if won {
            self.stop.cancel();
            self.done.cancel();
        }
        won
    }

    /// Publishes the stop notification without completing the handshake.
    ///
    /// Idempotent; returns `true` only for the transitioning call. Pair with
    /// [`StopSignal::complete`].
    pub fn publish(&self) -> bool {
        let won = self.transition();
        if won {
            self.stop.cancel();
        }
        won
    }

    /// Completes the handshake, releasing every loop blocked on
    /// [`StopSignal::handshake`].
    pub fn complete(&self) {
        self.done.cancel();
    }

    /// Non-blocking check for the stop notification.
    pub fn is_requested(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Completes once stop has been requested.
    pub async fn requested(&self) {
        self.stop.cancelled().await;
    }

    /// Completes once the publisher has finished the stop broadcast.
    pub async fn handshake(&self) {
        self.done.cancelled().await;
    }

    fn transition(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

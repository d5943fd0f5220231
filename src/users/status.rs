//! # Virtual-user status machine.
//!
//! Three states drive the runner's per-iteration decision:
//!
//! ```text
//! Normal ──► Interrupted   terminal: the loop exits after the current action
//! Normal ──► Skip          one iteration omits its interval sleep, then the
//!                          runner resets the status to Normal
//! ```
//!
//! `Interrupted` has no outgoing transition within a single loop run; reaching
//! it always ends that virtual user's loop.
//!
//! [`StatusMonitor`] is the capability trait: users that do not track status
//! are represented by the [`Passive`] adapter, which always reports `Normal`
//! and discards status changes.

use std::sync::atomic::{AtomicU8, Ordering};

/// Run status of one virtual user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Default state; the loop proceeds normally.
    #[default]
    Normal,
    /// Terminal for the current loop: the runner stops iterating after the
    /// current action completes.
    Interrupted,
    /// Skip the current iteration's interval sleep; the runner immediately
    /// resets the status to `Normal` and continues without delay.
    Skip,
}

impl Status {
    fn as_u8(self) -> u8 {
        match self {
            Status::Normal => 0,
            Status::Interrupted => 1,
            Status::Skip => 2,
        }
    }

    fn from_u8(v: u8) -> Status {
        match v {
            1 => Status::Interrupted,
            2 => Status::Skip,
            _ => Status::Normal,
        }
    }
}

/// Status capability of a virtual user.
///
/// Interior-mutable on purpose: the runner holds the user behind a shared
/// reference while inspecting status between iterations, and task actions may
/// flip it from inside an execution.
pub trait StatusMonitor: Send + Sync {
    /// Current status.
    fn status(&self) -> Status;
    /// Replaces the status.
    fn set_status(&self, status: Status);
}

/// Adapter for users without status tracking: always `Normal`, writes are
/// discarded. The runner falls back to this when
/// [`User::status_monitor`](crate::users::User::status_monitor) returns `None`.
#[derive(Debug, Default)]
pub struct Passive;

impl StatusMonitor for Passive {
    fn status(&self) -> Status {
        Status::Normal
    }

    fn set_status(&self, _status: Status) {}
}

/// Atomic status cell for users that do track status.
///
/// Embedded by [`UserCore`](crate::users::UserCore); safe to read from the
/// runner while a task action mutates it.
#[derive(Debug)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    /// Creates a cell in the `Normal` state.
    pub fn new() -> Self {
        Self(AtomicU8::new(Status::Normal.as_u8()))
    }

    /// Reads the current status.
    pub fn get(&self) -> Status {
        Status::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replaces the status.
    pub fn set(&self, status: Status) {
        self.0.store(status.as_u8(), Ordering::Release);
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMonitor for StatusCell {
    fn status(&self) -> Status {
        self.get()
    }

    fn set_status(&self, status: Status) {
        self.set(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_roundtrip() {
        let cell = StatusCell::new();
        assert_eq!(cell.get(), Status::Normal);
        cell.set(Status::Skip);
        assert_eq!(cell.get(), Status::Skip);
        cell.set(Status::Interrupted);
        assert_eq!(cell.get(), Status::Interrupted);
    }

    #[test]
    fn test_passive_discards_writes() {
        let p = Passive;
        p.set_status(Status::Interrupted);
        assert_eq!(p.status(), Status::Normal);
    }
}

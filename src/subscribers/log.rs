//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [user-starting]
//! [action-failed] task=checkout err="http 502" cycle=17
//! [action-panicked] task=checkout panic="index out of bounds" cycle=18
//! [cycle-limit] cycle=1000
//! [user-stopped] reason=interrupted cycle=42
//! [stop-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Prints human-readable event descriptions to stdout for debugging and
/// demonstration purposes. Not intended for production use — implement a
/// custom [`Subscribe`] for structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::UserStarting => {
                println!("[user-starting]");
            }
            EventKind::UserStopped => {
                println!(
                    "[user-stopped] reason={:?} cycle={:?}",
                    e.reason, e.cycle
                );
            }
            EventKind::StartFailed => {
                println!("[start-failed] err={:?}", e.reason);
            }
            EventKind::ActionFailed => {
                println!(
                    "[action-failed] task={:?} err={:?} cycle={:?}",
                    e.task, e.reason, e.cycle
                );
            }
            EventKind::ActionPanicked => {
                println!(
                    "[action-panicked] task={:?} panic={:?} cycle={:?}",
                    e.task, e.reason, e.cycle
                );
            }
            EventKind::NoTaskAvailable => {
                println!("[no-task-available]");
            }
            EventKind::CycleLimitReached => {
                println!("[cycle-limit] cycle={:?}", e.cycle);
            }
            EventKind::SkipApplied => {
                println!("[skip] cycle={:?}", e.cycle);
            }
            EventKind::StopRequested => {
                println!("[stop-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

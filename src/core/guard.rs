//! # Fault-isolation boundary.
//!
//! [`isolate`] wraps arbitrary user code (task actions, the whole loop body)
//! and converts an abrupt unwind into a structured [`UserError::Panic`] with
//! the payload rendered as text and a backtrace captured at the recovery
//! site. A panic inside an action therefore never terminates the hosting
//! execution unit, and the runner's deferred teardown still executes.

use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::UserError;

/// Runs `fut` under a recovery boundary.
///
/// On an unwind, returns `Err(UserError::Panic { .. })` carrying the panic
/// message and a backtrace captured here. The hosting task keeps running.
pub async fn isolate<F, T>(fut: F) -> Result<T, UserError>
where
    F: Future<Output = T>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(value) => Ok(value),
        Err(payload) => Err(UserError::Panic {
            message: panic_message(payload.as_ref()),
            trace: Backtrace::force_capture().to_string(),
        }),
    }
}

/// Renders a panic payload as text (`&str` and `String` payloads; anything
/// else gets a placeholder).
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

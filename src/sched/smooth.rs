//! # Smooth weighted round-robin selection with a one-time order drain.
//!
//! [`select_next`] is the pure selection algorithm behind every virtual
//! user's `next()`. It runs a two-phase protocol per user:
//!
//! **Phase A — order drain.** While the user's order phase is active, the
//! task with the smallest nonzero `order` runs next and its order is cleared
//! (one-time consumption). When no nonzero order remains, the phase flips off
//! permanently for the user's lifetime and selection falls through to Phase B
//! in the same call.
//!
//! **Phase B — smooth weighted round robin.** Every task's `current` credit
//! grows by its `effective` weight each round; the task with the maximum
//! credit wins and is debited by the round's weight total. Over N selections
//! each task's share converges to `weight_i / sum(weights)` without bursty
//! runs and without requiring a common divisor.
//!
//! ## Rules
//! - Empty list → no selection. Single entry → always that entry, no state
//!   mutation.
//! - Ties in Phase B break toward the first-encountered task, stable on the
//!   shuffled order established at user initialization.
//! - A task whose `effective` weight is 0 never wins unless all weights are
//!   zero, in which case the first task scanned wins every round. That
//!   degenerate behavior is defined and kept.

use crate::tasks::Task;

/// Picks the next task to run, returning its index into `tasks`.
///
/// `order_phase` is the user's one-way order-drain flag: it starts true at
/// user initialization and this function flips it to false once all
/// order-tagged tasks have been consumed. It is never flipped back, even if a
/// task's order is set again afterwards.
pub fn select_next(tasks: &mut [Task], order_phase: &mut bool) -> Option<usize> {
    match tasks.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }

    if *order_phase {
        if let Some(idx) = next_ordered(tasks) {
            tasks[idx].clear_order();
            return Some(idx);
        }
        *order_phase = false;
    }

    next_smooth(tasks)
}

/// Returns the index of the task with the smallest nonzero order, if any.
fn next_ordered(tasks: &[Task]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, task) in tasks.iter().enumerate() {
        if task.order() == 0 {
            continue;
        }
        match best {
            Some(b) if tasks[b].order() <= task.order() => {}
            _ => best = Some(i),
        }
    }
    best
}

/// One round of smooth weighted round robin over the whole slice.
fn next_smooth(tasks: &mut [Task]) -> Option<usize> {
    let mut total: i64 = 0;
    let mut best: Option<usize> = None;

    for i in 0..tasks.len() {
        let effective = tasks[i].smooth.effective;
        tasks[i].smooth.current += effective;
        total += effective;

        // strict comparison: ties stay with the first-encountered task
        match best {
            Some(b) if tasks[i].smooth.current <= tasks[b].smooth.current => {}
            _ => best = Some(i),
        }
    }

    let winner = best?;
    tasks[winner].smooth.current -= total;
    Some(winner)
}

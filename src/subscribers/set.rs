//! # SubscriberSet: the fan-out stage between the bus and subscribers.
//!
//! [`SubscriberSet`] gives every subscriber its own bounded lane and worker,
//! so one slow or crashing subscriber never affects the publishers or the
//! other subscribers. The harness hands it the bus receiver via
//! [`SubscriberSet::listen`]; the set then owns the single listener for the
//! whole run and flushes the backlog before shutting its lanes down.
//!
//! ## What it guarantees
//! - Forwarding an event never blocks.
//! - Per-subscriber FIFO (lane order).
//! - A panicking handler is recovered at the same isolation boundary the
//!   runner uses for task actions.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers (use `Event::seq`).
//! - No retries on lane overflow: the event is dropped for that subscriber
//!   only, with a warning.
//!
//! ## Diagram
//! ```text
//! Bus ──► listen() ──► emit(&Event)
//!                        │         (one clone per lane)
//!                        ├──► [lane S1] ─► worker S1 ─► on_event()
//!                        ├──► [lane S2] ─► worker S2 ─► on_event()
//!                        └──► [lane SN] ─► worker SN ─► on_event()
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::guard::isolate;
use crate::events::Event;

use super::Subscribe;

/// One subscriber's bounded queue plus the name used in drop diagnostics.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Event>,
}

/// Per-subscriber lanes with dedicated worker tasks.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the lanes and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, mut rx) = mpsc::channel::<Event>(sub.queue_capacity().max(1));
            let name = sub.name();

            let worker = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    if let Err(fault) = isolate(sub.on_event(&ev)).await {
                        eprintln!("[stampede] subscriber '{}' panicked: {fault}", sub.name());
                    }
                }
            });

            lanes.push(Lane { name, tx });
            workers.push(worker);
        }

        Self { lanes, workers }
    }

    /// Forwards one event to every lane without blocking.
    ///
    /// A full or closed lane drops the event for that subscriber and logs a
    /// warning with the subscriber's name.
    pub fn emit(&self, event: &Event) {
        for lane in &self.lanes {
            match lane.tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[stampede] subscriber '{}' dropped event: lane full",
                        lane.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[stampede] subscriber '{}' dropped event: worker gone",
                        lane.name
                    );
                }
            }
        }
    }

    /// Consumes the set and becomes the run's bus listener.
    ///
    /// Forwards every received event until `flush` fires, then delivers
    /// whatever is still buffered in the bus and shuts the lanes down. The
    /// returned handle completes once all workers have drained.
    pub fn listen(
        self,
        mut rx: broadcast::Receiver<Event>,
        flush: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => self.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            eprintln!("[stampede] event listener lagged by {n} events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = flush.cancelled() => break,
                }
            }
            while let Ok(ev) = rx.try_recv() {
                self.emit(&ev);
            }
            self.shutdown().await;
        })
    }

    /// Graceful shutdown: closes all lanes and awaits worker completion.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

//! # Non-blocking event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] gives each subscriber its own lane: a bounded queue
//! plus a worker task that feeds `on_event` one item at a time. Publishing
//! never blocks; a lane that cannot keep up drops events for itself only.
//!
//! ```text
//! dispatch(event)
//!     │
//!     ├──► lane 1 (queue + worker) ──► subscriber1.on_event()
//!     ├──► lane 2 (queue + worker) ──► subscriber2.on_event()
//!     └──► lane N (queue + worker) ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N
//!   while B processes N+5; within a lane, delivery is FIFO
//! - **Overflow**: the event is dropped for that lane only and a
//!   `SubscriberOverflow` is published
//! - **Isolation**: a panicking subscriber is reported via
//!   `SubscriberPanicked` and its worker moves on to the next event
//! - **Shutdown**: [`SubscriberSet::shutdown`] closes every queue and waits
//!   for the workers to finish what was already enqueued

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// One subscriber's queue and worker.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    worker: JoinHandle<()>,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and opens one lane per subscriber.
    ///
    /// Queue capacity comes from [`Subscribe::queue_capacity`], clamped to a
    /// minimum of 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let lanes = subs
            .into_iter()
            .map(|sub| open_lane(sub, bus.clone()))
            .collect();
        Self { lanes, bus }
    }

    /// Hands one event to every lane without blocking.
    ///
    /// A lane whose queue is full (or whose worker is gone) loses the event
    /// and a `SubscriberOverflow` is published in its place. Diagnostic
    /// events that fail to enqueue are dropped outright, so a saturated
    /// queue cannot feed itself.
    pub fn dispatch(&self, event: Arc<Event>) {
        let diagnostic = matches!(
            event.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        );

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !diagnostic {
                self.bus
                    .publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Flushes and stops every lane.
    ///
    /// Senders drop first; each worker then drains whatever is still in its
    /// queue and exits, and this resolves once all of them have.
    pub async fn shutdown(self) {
        let workers: Vec<JoinHandle<()>> = self
            .lanes
            .into_iter()
            .map(|lane| {
                drop(lane.tx);
                lane.worker
            })
            .collect();

        for worker in workers {
            let _ = worker.await;
        }
    }
}

/// Spawns the worker that feeds one subscriber from its queue.
///
/// A panic in `on_event` is caught, reported as `SubscriberPanicked`, and
/// the worker continues with the next event.
fn open_lane(sub: Arc<dyn Subscribe>, bus: Bus) -> Lane {
    let name = sub.name();
    let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

    let worker = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
                .catch_unwind()
                .await;
            if let Err(payload) = handled {
                bus.publish(Event::subscriber_panicked(
                    sub.name(),
                    panic_message(payload.as_ref()),
                ));
            }
        }
    });

    Lane { name, tx, worker }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

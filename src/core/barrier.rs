//! # Barrier: orchestrates admission, drain, and teardown.
//!
//! The [`Barrier`] owns the event bus, a [`SubscriberSet`], and the pending
//! registry. [`Barrier::run`] drives the state machine
//! `Admitting → Draining → Closed` and resolves exactly when `Closed` is
//! reached.
//!
//! ## High-level architecture
//! ```text
//! BarrierHandle::submit(group) ──► Bus ──► coordination loop (run)
//! BarrierHandle::cancel(token) ──► Bus ──►   │
//! BarrierHandle::close()       ──► Bus ──►   │
//!                                            │ Admitting:
//!                                            │   GroupRegistered → PendingSet::add
//!                                            │                    + cancel line
//!                                            │                    + spawn GroupRunner
//!                                            │   window elapses  → AdmissionTimedOut
//!                                            │ Draining:
//!                                            │   GroupFinished / GroupCancelled
//!                                            │     → PendingSet::remove
//!                                            │     → Drained → RegistryEmpty
//!                                            │ Closed:
//!                                            │   runtime_token.cancel()
//!                                            │   + await fan-out flush
//!                                            ▼
//!             fan-out listener ──► SubscriberSet ──► per-subscriber workers
//! ```
//!
//! ## Rules
//! - The coordination loop is the **only** owner of the [`PendingSet`] and
//!   of the per-group cancel lines; every mutation arrives through the
//!   serialized bus stream
//! - Cancels are durable: the loop trips the group's cancel line
//!   (a level-triggered [`CancellationToken`]), so a `GroupCancelled`
//!   enqueued before the registration was even processed still reaches the
//!   runner
//! - Registrations after the window closes are ignored: no registry
//!   mutation, no emitted messages
//! - A job or runner failure never reaches the barrier; it degrades to a
//!   `GroupCancelled` for that one token
//! - On `Closed` the runtime token tears down lingering group runners, and
//!   the fan-out listener drains queued events through the subscriber set
//!   before `run` returns

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::BarrierConfig;
use crate::core::admission::AdmissionWindow;
use crate::core::registry::{PendingSet, Removal};
use crate::core::runner::GroupRunner;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobGroup, Token};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Handle for feeding a running barrier from the outside.
///
/// This is the interface the rendering lifecycle talks to: `submit` on
/// mount, `cancel` on teardown, `close` when no further registrations can
/// occur. Cheap to clone; all methods are non-blocking.
#[derive(Clone)]
pub struct BarrierHandle {
    bus: Bus,
}

impl BarrierHandle {
    /// Requests admission of a job-group.
    ///
    /// Ignored silently if the admission window has already closed. Groups
    /// with an empty job list are never admitted.
    pub fn submit(&self, group: JobGroup) {
        let token = group.token().clone();
        self.bus.publish(
            Event::new(EventKind::GroupRegistered)
                .with_token(token)
                .with_group(group),
        );
    }

    /// Requests cancellation of one group by token.
    ///
    /// Safe to call repeatedly and for unknown tokens; removal from the
    /// pending registry is idempotent. A cancel issued right after `submit`
    /// is never lost, even if the barrier has not processed the
    /// registration yet.
    pub fn cancel(&self, token: &Token) {
        self.bus
            .publish(Event::new(EventKind::GroupCancelled).with_token(token.clone()));
    }

    /// Explicitly closes the admission window.
    ///
    /// Groups already admitted keep running; the barrier moves to draining.
    /// Closing an already-closed window is a no-op.
    pub fn close(&self) {
        self.bus.publish(Event::new(EventKind::AdmissionCloseRequested));
    }
}

/// Builder for constructing a [`Barrier`] with optional subscribers.
pub struct BarrierBuilder {
    cfg: BarrierConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl BarrierBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BarrierConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive barrier events (admission, outcomes, drain)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the barrier instance.
    pub fn build(self) -> Barrier {
        Barrier::new(self.cfg, self.subscribers)
    }
}

/// Top-level completion barrier: one instance per server request.
///
/// Opens an admission window, runs every admitted job-group against
/// cancellation and a deadline, and releases the caller exactly when all
/// admitted groups have drained (finished or cancelled).
pub struct Barrier {
    cfg: BarrierConfig,
    bus: Bus,
    subs: SubscriberSet,
    runtime_token: CancellationToken,
    /// Coordination stream; created at construction so submissions enqueued
    /// before `run()` starts are not lost.
    coord_rx: broadcast::Receiver<Event>,
    /// Fan-out stream feeding the subscriber set.
    fanout_rx: broadcast::Receiver<Event>,
}

impl Barrier {
    /// Creates a barrier with the given config and subscribers.
    pub fn new(cfg: BarrierConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(subscribers, bus.clone());
        let coord_rx = bus.subscribe();
        let fanout_rx = bus.subscribe();
        Self {
            cfg,
            bus,
            subs,
            runtime_token: CancellationToken::new(),
            coord_rx,
            fanout_rx,
        }
    }

    /// Returns a builder for the given configuration.
    pub fn builder(cfg: BarrierConfig) -> BarrierBuilder {
        BarrierBuilder::new(cfg)
    }

    /// Returns a handle for submitting and cancelling groups.
    pub fn handle(&self) -> BarrierHandle {
        BarrierHandle {
            bus: self.bus.clone(),
        }
    }

    /// Runs the barrier to completion: resolves exactly when `Closed` is
    /// reached.
    ///
    /// ### State machine
    /// - **Admitting**: accepts `GroupRegistered` until the window elapses
    ///   or an explicit close request arrives; outcome events already
    ///   retire tokens during this phase
    /// - **Draining**: entered when admission closes; if the registry is
    ///   already empty the barrier closes immediately, otherwise it waits
    ///   for the drain transition
    /// - **Closed**: the runtime token is cancelled, tearing down lingering
    ///   group runners; queued events are flushed through the subscribers
    ///   before this resolves
    ///
    /// Worst-case duration is bounded by
    /// `admission_timeout + group_timeout` when `hosted = false`: every
    /// internal failure degrades to a cancellation rather than propagating.
    pub async fn run(self) {
        let Barrier {
            cfg,
            bus,
            subs,
            runtime_token,
            mut coord_rx,
            fanout_rx,
        } = self;

        let fanout = spawn_fanout(fanout_rx, subs, runtime_token.clone());

        let mut pending = PendingSet::new();
        let mut cancels: HashMap<Token, CancellationToken> = HashMap::new();
        let mut window = AdmissionWindow::open(cfg.admission_timeout, cfg.admission_clock);

        // Admitting
        loop {
            tokio::select! {
                _ = window.elapsed() => {
                    bus.publish(Event::new(EventKind::AdmissionTimedOut));
                    break;
                }
                msg = coord_rx.recv() => match msg {
                    Ok(ev) => match ev.kind {
                        EventKind::GroupRegistered => {
                            if let Some(group) = ev.group {
                                admit(
                                    group,
                                    &cfg,
                                    &bus,
                                    &runtime_token,
                                    &mut pending,
                                    &mut cancels,
                                    &mut window,
                                );
                            }
                        }
                        EventKind::AdmissionCloseRequested => break,
                        EventKind::GroupCancelled => {
                            signal_cancel(ev.token.as_ref(), &cancels);
                            retire(ev.token.as_ref(), &bus, &mut pending, &mut cancels);
                        }
                        EventKind::GroupFinished => {
                            retire(ev.token.as_ref(), &bus, &mut pending, &mut cancels);
                        }
                        _ => {}
                    },
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }

        // Draining
        while !pending.is_empty() {
            match coord_rx.recv().await {
                Ok(ev) => match ev.kind {
                    EventKind::GroupCancelled => {
                        signal_cancel(ev.token.as_ref(), &cancels);
                        retire(ev.token.as_ref(), &bus, &mut pending, &mut cancels);
                    }
                    EventKind::GroupFinished => {
                        retire(ev.token.as_ref(), &bus, &mut pending, &mut cancels);
                    }
                    // Registrations after close: no registry mutation, no
                    // emitted messages.
                    _ => {}
                },
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }

        // Closed: tear down runners, then let the fan-out listener flush
        // queued events through the subscriber workers.
        runtime_token.cancel();
        let _ = fanout.await;
    }
}

/// Admits one group: registers its token and cancel line, spawns its runner.
fn admit(
    group: JobGroup,
    cfg: &BarrierConfig,
    bus: &Bus,
    runtime_token: &CancellationToken,
    pending: &mut PendingSet,
    cancels: &mut HashMap<Token, CancellationToken>,
    window: &mut AdmissionWindow,
) {
    if group.jobs().is_empty() {
        return;
    }
    let token = group.token().clone();
    // Duplicate tokens keep the registry intact; the later registration's
    // cancel line wins and the extra runner's outcome is an idempotent
    // removal.
    pending.add(token.clone());
    window.note_admission();

    // The cancel line exists before the runner is spawned, and only this
    // loop trips it, so any cancel processed from here on is observed by
    // the runner even if it has not been polled yet.
    let cancel_line = CancellationToken::new();
    cancels.insert(token.clone(), cancel_line.clone());

    let runner = GroupRunner::new(group, cfg.group_deadline(), bus.clone(), cancel_line);
    tokio::spawn(runner.run(runtime_token.child_token()));

    bus.publish(Event::new(EventKind::GroupAdmitted).with_token(token));
}

/// Trips the cancel line for `token`, if one is registered.
fn signal_cancel(token: Option<&Token>, cancels: &HashMap<Token, CancellationToken>) {
    let Some(token) = token else { return };
    if let Some(line) = cancels.get(token) {
        line.cancel();
    }
}

/// Retires one token on an outcome event; announces the drain transition.
fn retire(
    token: Option<&Token>,
    bus: &Bus,
    pending: &mut PendingSet,
    cancels: &mut HashMap<Token, CancellationToken>,
) {
    let Some(token) = token else { return };
    cancels.remove(token);
    if pending.remove(token) == Removal::Drained {
        bus.publish(Event::new(EventKind::RegistryEmpty));
    }
}

/// Forwards bus events to the subscriber set until teardown, then shuts the
/// set down so every delivered event is fully processed.
///
/// Biased toward draining: events already queued are delivered before the
/// cancellation branch is taken.
fn spawn_fanout(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    runtime_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.dispatch(Arc::new(ev)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = runtime_token.cancelled() => break,
            }
        }
        subs.shutdown().await;
    })
}

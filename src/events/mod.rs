//! Barrier events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the barrier loop, group runners,
//! handles and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `BarrierHandle`, `GroupRunner`, the barrier loop,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the barrier's coordination loop (owns the pending
//!   registry and the per-group cancel lines) and the fan-out listener
//!   (feeds `SubscriberSet`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

//! Barrier core: admission, racing, and drain coordination.
//!
//! The public API from this module is [`Barrier`] (with its builder and
//! handle), which orchestrates group admission, per-group racing, and the
//! drain that releases the caller.
//!
//! Internal modules:
//! - [`admission`]: admission-window deadline tracking;
//! - [`executor`]: runs one group's jobs concurrently to completion;
//! - [`runner`]: races a group against cancellation and its deadline;
//! - [`registry`]: the pending set of in-flight group tokens;
//! - [`barrier`]: the `Admitting → Draining → Closed` state machine.

mod admission;
mod barrier;
mod executor;
mod registry;
mod runner;

pub use barrier::{Barrier, BarrierBuilder, BarrierHandle};

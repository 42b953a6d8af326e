//! # Event subscribers for barrier observability.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver barrier events to user code without blocking the
//! publisher.
//!
//! ```text
//! Event flow:
//!   Bus ──► fan-out listener (in Barrier) ──► SubscriberSet::dispatch
//!                                               │
//!                                          ┌────┴────┬────────┐
//!                                          ▼         ▼        ▼
//!                                     LogWriter   Metrics   Custom ...
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

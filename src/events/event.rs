//! # Barrier events: the action-message protocol plus runtime diagnostics.
//!
//! The [`EventKind`] enum covers three categories:
//! - **Admission protocol**: registration requests, explicit close, window expiry
//! - **Group lifecycle**: admitted, finished, cancelled, timed out, job failure
//! - **Fan-out diagnostics**: subscriber overflow and panic reports
//!
//! The [`Event`] struct carries the metadata for a kind: the group token,
//! a human-readable reason, the elapsed timeout, and — for registration
//! requests only — the crate-private [`JobGroup`] payload.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order across subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::jobs::{JobGroup, Token};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of barrier events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission protocol ===
    /// Request to admit a new job-group.
    ///
    /// Published by [`BarrierHandle::submit`](crate::BarrierHandle::submit).
    /// Ignored silently once the admission window has closed.
    ///
    /// Sets: `token`, `group` (crate-private), `at`, `seq`
    GroupRegistered,

    /// Explicit request to stop admitting new groups.
    ///
    /// Published by [`BarrierHandle::close`](crate::BarrierHandle::close).
    /// Closing an already-closed window is a no-op.
    ///
    /// Sets: `at`, `seq`
    AdmissionCloseRequested,

    /// The admission window elapsed without an explicit close request.
    ///
    /// Emitted at most once per barrier.
    ///
    /// Sets: `at`, `seq`
    AdmissionTimedOut,

    // === Group lifecycle ===
    /// A group's token entered the pending registry and its runner started.
    ///
    /// Sets: `token`, `at`, `seq`
    GroupAdmitted,

    /// Every job in the group completed; the group's outcome is finished.
    ///
    /// Also serves as the removal trigger for the pending registry.
    ///
    /// Sets: `token`, `at`, `seq`
    GroupFinished,

    /// Cancellation addressed to one group's token.
    ///
    /// Doubles as the external cancel request
    /// ([`BarrierHandle::cancel`](crate::BarrierHandle::cancel)) and as the
    /// runner's self-issued outcome on timeout or job failure. Either way it
    /// triggers an idempotent removal from the pending registry.
    ///
    /// Sets: `token`, `reason` (self-issued only), `at`, `seq`
    GroupCancelled,

    /// A group's deadline elapsed before its jobs finished.
    ///
    /// Always followed by `GroupCancelled` for the same token. Never emitted
    /// in a hosted context.
    ///
    /// Sets: `token`, `timeout_ms`, `at`, `seq`
    GroupTimedOut,

    /// A job inside a group failed.
    ///
    /// Always followed by `GroupCancelled` for the same token; the failure
    /// never propagates past the group runner.
    ///
    /// Sets: `token`, `reason`, `at`, `seq`
    JobFailed,

    /// The pending registry transitioned from non-empty to empty.
    ///
    /// Emitted exactly once per transition; never while still non-empty,
    /// never on removals from an already-empty registry.
    ///
    /// Sets: `at`, `seq`
    RegistryEmpty,

    // === Fan-out diagnostics ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason`, `at`, `seq`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason`, `at`, `seq`
    SubscriberPanicked,
}

/// Barrier event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Token of the group, if applicable.
    pub token: Option<Token>,
    /// Human-readable reason (job errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Elapsed group deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,

    /// Group payload (used only for `GroupRegistered`).
    pub(crate) group: Option<JobGroup>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            token: None,
            reason: None,
            timeout_ms: None,
            group: None,
        }
    }

    /// Attaches a group token.
    #[inline]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    #[inline]
    pub(crate) fn with_group(mut self, group: JobGroup) -> Self {
        self.group = Some(group);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_fields() {
        let token = Token::from("a");
        let ev = Event::new(EventKind::GroupTimedOut)
            .with_token(token.clone())
            .with_timeout(Duration::from_secs(5))
            .with_reason("deadline");

        assert_eq!(ev.kind, EventKind::GroupTimedOut);
        assert_eq!(ev.token, Some(token));
        assert_eq!(ev.timeout_ms, Some(5000));
        assert_eq!(ev.reason.as_deref(), Some("deadline"));
    }

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::RegistryEmpty);
        let b = Event::new(EventKind::RegistryEmpty);
        assert!(b.seq > a.seq);
    }
}

//! # Admission window: the bounded span during which groups may register.
//!
//! [`AdmissionWindow`] tracks the deadline after which the barrier stops
//! admitting new job-groups. The deadline is either fixed at the window's
//! start ([`AdmissionClock::FixedWindow`]) or pushed forward by each
//! accepted registration ([`AdmissionClock::RestartOnRegister`]).
//!
//! The window only models the clock; the explicit close signal
//! (`AdmissionCloseRequested`) is handled by the barrier loop, which simply
//! stops consulting the window once it observes the event.

use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::AdmissionClock;

/// Deadline tracker for the admission phase.
pub(crate) struct AdmissionWindow {
    clock: AdmissionClock,
    timeout: Duration,
    deadline: Instant,
}

impl AdmissionWindow {
    /// Opens the window now; it elapses after `timeout`.
    pub(crate) fn open(timeout: Duration, clock: AdmissionClock) -> Self {
        Self {
            clock,
            timeout,
            deadline: Instant::now() + timeout,
        }
    }

    /// Resolves when the window's deadline passes.
    ///
    /// Safe to re-create across `select!` iterations: the deadline is
    /// absolute, not a restarted sleep.
    pub(crate) async fn elapsed(&self) {
        time::sleep_until(self.deadline).await;
    }

    /// Notes an accepted registration; restarts the clock if configured.
    pub(crate) fn note_admission(&mut self) {
        if self.clock == AdmissionClock::RestartOnRegister {
            self.deadline = Instant::now() + self.timeout;
        }
    }
}

//! # Group runner: one job-group raced against cancellation and a deadline.
//!
//! A [`GroupRunner`] drives a single [`JobGroup`] to exactly one outcome.
//! Three competing operations are live simultaneously until one resolves:
//!
//! ```text
//! run_all(jobs) ──────────┐
//! cancel line (token) ────┼──► first to resolve decides the outcome
//! deadline sleep ─────────┘
//! ```
//!
//! ## Tie-break
//! - executor resolves `Ok` first → outcome `Finished`
//! - executor resolves `Err` first → `JobFailed` published, outcome `Cancelled`
//! - cancel line first (tripped by the coordination loop on a
//!   `GroupCancelled` addressed to this token) → `Cancelled`
//! - deadline first → `GroupTimedOut` published, outcome `Cancelled`
//!
//! ## Rules
//! - Exactly one outcome event per token: `GroupFinished` or `GroupCancelled`
//! - Job errors never propagate past the runner; they become cancellations
//! - On `Cancelled`, every job exposing [`Cancellable`](crate::Cancellable)
//!   is cancelled before the outcome is reported; the rest are abandoned
//! - On barrier teardown (runtime token) the runner exits without reporting

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::executor::run_all;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::JobGroup;

/// Tagged result of a group run. Exactly one per group, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    /// All jobs in the group completed.
    Finished,
    /// Cancellation, deadline, or a job failure ended the group early.
    Cancelled,
}

/// Runs one job-group to a single reported outcome.
pub(crate) struct GroupRunner {
    group: JobGroup,
    /// Effective deadline; `None` on hosted contexts (watcher never fires).
    deadline: Option<Duration>,
    bus: Bus,
    /// Tripped by the coordination loop when it processes a `GroupCancelled`
    /// addressed to this group's token. Level-triggered: a cancel that lands
    /// before the runner is first polled is still observed.
    cancel_line: CancellationToken,
}

impl GroupRunner {
    pub(crate) fn new(
        group: JobGroup,
        deadline: Option<Duration>,
        bus: Bus,
        cancel_line: CancellationToken,
    ) -> Self {
        Self {
            group,
            deadline,
            bus,
            cancel_line,
        }
    }

    /// Races the group's jobs against cancellation and the deadline, then
    /// reports the outcome on the bus.
    pub(crate) async fn run(self, runtime_token: CancellationToken) {
        let token = self.group.token().clone();

        let executor = run_all(self.group.jobs());
        tokio::pin!(executor);

        let mut reason: Option<&'static str> = None;
        let outcome = tokio::select! {
            res = &mut executor => match res {
                Ok(()) => Outcome::Finished,
                Err(e) => {
                    self.bus.publish(
                        Event::new(EventKind::JobFailed)
                            .with_token(token.clone())
                            .with_reason(e.to_string()),
                    );
                    reason = Some("job_failed");
                    Outcome::Cancelled
                }
            },
            _ = self.cancel_line.cancelled() => Outcome::Cancelled,
            _ = deadline_elapsed(self.deadline) => {
                if let Some(d) = self.deadline {
                    self.bus.publish(
                        Event::new(EventKind::GroupTimedOut)
                            .with_token(token.clone())
                            .with_timeout(d),
                    );
                }
                reason = Some("deadline");
                Outcome::Cancelled
            },
            _ = runtime_token.cancelled() => return,
        };

        match outcome {
            Outcome::Finished => {
                self.bus
                    .publish(Event::new(EventKind::GroupFinished).with_token(token));
            }
            Outcome::Cancelled => {
                for job in self.group.jobs() {
                    if let Some(c) = job.as_cancellable() {
                        c.cancel();
                    }
                }
                let mut ev = Event::new(EventKind::GroupCancelled).with_token(token);
                if let Some(r) = reason {
                    ev = ev.with_reason(r);
                }
                self.bus.publish(ev);
            }
        }
    }
}

/// Resolves when the effective deadline elapses; never on hosted contexts.
async fn deadline_elapsed(deadline: Option<Duration>) {
    match deadline {
        Some(d) => time::sleep(d).await,
        None => std::future::pending().await,
    }
}

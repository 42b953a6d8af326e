//! # Barrier configuration.
//!
//! Provides [`BarrierConfig`] — the immutable settings one barrier instance
//! is built with. Options are merged once at construction; there is no
//! runtime reconfiguration.
//!
//! ## Sentinel values
//! - `group_timeout = 0s` → no per-group deadline (treated as `None` by
//!   [`BarrierConfig::group_deadline`])
//! - `hosted = true` → per-group deadline disabled regardless of
//!   `group_timeout` (browser-like execution context)

use std::time::Duration;

/// Policy for the admission-window clock.
///
/// The admission window bounds how long a barrier keeps accepting new
/// job-group registrations. Two interpretations exist in the wild; the
/// barrier makes the choice explicit instead of silently picking one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdmissionClock {
    /// The window spans exactly `admission_timeout`, measured from its own
    /// start. Accepted registrations do not move the deadline.
    #[default]
    FixedWindow,

    /// Every accepted registration restarts the clock: the window closes
    /// only after `admission_timeout` of registration silence.
    RestartOnRegister,
}

/// Configuration for one [`Barrier`](crate::Barrier) instance.
///
/// Defines:
/// - **Admission**: how long new job-groups may register, and whether the
///   clock restarts on activity
/// - **Group budget**: per-group deadline before force-cancellation
/// - **Execution context**: hosted (browser-like) vs. server-side
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `admission_timeout`: length of the admission window
/// - `group_timeout`: per-group budget (`0s` = no deadline)
/// - `hosted`: `true` disables the per-group deadline entirely; a hung group
///   then waits indefinitely for an explicit cancel
/// - `admission_clock`: fixed window vs. restart-on-register
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct BarrierConfig {
    /// Length of the admission window.
    ///
    /// The window opens when [`Barrier::run`](crate::Barrier::run) starts
    /// and closes after this duration unless an explicit close request
    /// arrives first. Independent of `group_timeout`: a group admitted near
    /// the end of the window still gets its full group budget.
    pub admission_timeout: Duration,

    /// Per-group deadline before force-cancellation.
    ///
    /// - `Duration::ZERO` = no deadline (group runs until finished or
    ///   explicitly cancelled)
    /// - `> 0` = the group is cancelled once this much time elapses after
    ///   admission
    pub group_timeout: Duration,

    /// Whether the barrier runs in a hosted (browser-like) context.
    ///
    /// When `true` the per-group deadline watcher never fires; the deadline
    /// is purely a server-side safety net.
    pub hosted: bool,

    /// How the admission-window clock behaves under activity.
    pub admission_clock: AdmissionClock,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Listeners that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl BarrierConfig {
    /// Returns the effective per-group deadline as an `Option`.
    ///
    /// - `None` → no deadline (`group_timeout == 0` or `hosted == true`)
    /// - `Some(d)` → the group is force-cancelled after `d`
    #[inline]
    pub fn group_deadline(&self) -> Option<Duration> {
        if self.hosted || self.group_timeout == Duration::ZERO {
            None
        } else {
            Some(self.group_timeout)
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for BarrierConfig {
    /// Default configuration:
    ///
    /// - `admission_timeout = 1s` (one render pass worth of registrations)
    /// - `group_timeout = 5s` (server-side safety net per group)
    /// - `hosted = false` (server context; deadlines active)
    /// - `admission_clock = FixedWindow` (activity does not extend the window)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            admission_timeout: Duration::from_secs(1),
            group_timeout: Duration::from_secs(5),
            hosted: false,
            admission_clock: AdmissionClock::FixedWindow,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_group_timeout_means_no_deadline() {
        let cfg = BarrierConfig {
            group_timeout: Duration::ZERO,
            ..BarrierConfig::default()
        };
        assert_eq!(cfg.group_deadline(), None);
    }

    #[test]
    fn test_hosted_disables_deadline() {
        let cfg = BarrierConfig {
            hosted: true,
            group_timeout: Duration::from_secs(5),
            ..BarrierConfig::default()
        };
        assert_eq!(cfg.group_deadline(), None);
    }

    #[test]
    fn test_server_context_keeps_deadline() {
        let cfg = BarrierConfig::default();
        assert_eq!(cfg.group_deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = BarrierConfig {
            bus_capacity: 0,
            ..BarrierConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}

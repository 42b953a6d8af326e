//! # Job abstraction and the cancellation capability.
//!
//! This module defines the [`Job`] trait (an opaque, asynchronous unit of
//! work) and the [`Cancellable`] capability that jobs may optionally expose.
//! The common handle type is [`JobRef`], an `Arc<dyn Job>` suitable for
//! sharing across the runtime.
//!
//! Whether a job is cancellable is decided by capability presence, not by
//! inspecting its shape at runtime: the group runner asks
//! [`Job::as_cancellable`] and cancels whatever answers. Jobs without the
//! capability are simply abandoned (not awaited) once their group is
//! declared cancelled — the runtime never preempts opaque work.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::JobError;

/// # Opaque asynchronous unit of work.
///
/// Jobs carry no identity beyond group membership. A job runs once per
/// group execution; the barrier never retries it.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use rendergate::{Job, JobError};
///
/// struct FetchProfile;
///
/// #[async_trait]
/// impl Job for FetchProfile {
///     async fn run(&self) -> Result<(), JobError> {
///         // load data, populate a store...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Executes the job to completion.
    async fn run(&self) -> Result<(), JobError>;

    /// Returns the job's cancellation capability, if it has one.
    ///
    /// The group runner calls [`Cancellable::cancel`] on every job that
    /// exposes the capability before reporting the group as cancelled.
    /// The default is `None`: the job will be abandoned instead.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }
}

/// Capability interface for jobs that can be asked to stop early.
///
/// `cancel` must be idempotent and must not block; cancellation is
/// cooperative — the job observes the request at its next await point.
pub trait Cancellable: Send + Sync {
    /// Requests cooperative cancellation of the job.
    fn cancel(&self);
}

/// Shared handle to a job.
pub type JobRef = Arc<dyn Job>;

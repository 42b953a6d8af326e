//! # Closure-backed jobs (`JobFn`, `CancellableFn`).
//!
//! [`JobFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! run. This avoids shared mutable state; if jobs need common state, move an
//! `Arc<...>` into the closure explicitly.
//!
//! [`CancellableFn`] is the same shape with the cancellation capability
//! attached: it owns a [`CancellationToken`], hands a clone of it to the
//! closure, and implements [`Cancellable`] by cancelling that token. The
//! closure decides how (and whether) to observe the request.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;
use crate::jobs::job::{Cancellable, Job, JobRef};

/// Function-backed job without a cancellation capability.
///
/// Once its group is cancelled this job is abandoned, not stopped.
///
/// ## Example
/// ```
/// use rendergate::{JobFn, JobError, JobRef};
///
/// let job: JobRef = JobFn::arc(|| async {
///     // do work...
///     Ok::<(), JobError>(())
/// });
/// ```
pub struct JobFn<F> {
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the job and returns it as a shared handle (`Arc<dyn Job>`).
    pub fn arc<Fut>(f: F) -> JobRef
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), JobError> {
        (self.f)().await
    }
}

/// Function-backed job with the cancellation capability.
///
/// The closure receives a child of the job's own [`CancellationToken`] and
/// should exit promptly once it observes cancellation. Jobs that never look
/// at the token still compile; they are merely abandoned like a plain
/// [`JobFn`].
///
/// ## Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use rendergate::{CancellableFn, JobError, JobRef};
///
/// let job: JobRef = CancellableFn::arc(|ctx: CancellationToken| async move {
///     tokio::select! {
///         _ = ctx.cancelled() => Err(JobError::Canceled),
///         _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => Ok(()),
///     }
/// });
/// ```
pub struct CancellableFn<F> {
    token: CancellationToken,
    f: F,
}

impl<F> CancellableFn<F> {
    /// Creates a new cancellable function-backed job with its own token.
    pub fn new(f: F) -> Self {
        Self {
            token: CancellationToken::new(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle (`Arc<dyn Job>`).
    pub fn arc<Fut>(f: F) -> JobRef
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Job for CancellableFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), JobError> {
        (self.f)(self.token.child_token()).await
    }

    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        Some(self)
    }
}

impl<F> Cancellable for CancellableFn<F>
where
    F: Send + Sync,
{
    fn cancel(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_job_fn_runs_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let job = {
            let hits = Arc::clone(&hits);
            JobFn::arc(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        job.run().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(job.as_cancellable().is_none());
    }

    #[tokio::test]
    async fn test_cancellable_fn_observes_cancel() {
        let job = CancellableFn::arc(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(JobError::Canceled)
        });
        job.as_cancellable().unwrap().cancel();
        assert!(matches!(job.run().await, Err(JobError::Canceled)));
    }
}

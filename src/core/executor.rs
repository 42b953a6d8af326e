//! # Job executor: run one group's jobs concurrently to completion.
//!
//! [`run_all`] spawns every job as its own tokio task and resolves once all
//! of them have completed, checking results in the original order. If any
//! job fails, the whole operation fails with the **first** error encountered
//! after the others have been observed; the executor itself never cancels
//! peers — that is the group runner's call.
//!
//! ## Rules
//! - Jobs run **concurrently** (one spawned task each), results are
//!   inspected in registration order
//! - First error wins; later errors are dropped
//! - A panicking job is converted to [`JobError::Fail`], never unwound
//! - No retries, no side effects beyond running the jobs
//!
//! Because jobs are detached tasks, a caller that stops awaiting the
//! returned future merely abandons them; they are not force-terminated.

use tokio::task::JoinHandle;

use crate::error::JobError;
use crate::jobs::JobRef;

/// Runs all jobs concurrently; resolves when every job has completed.
///
/// Returns `Ok(())` if every job succeeded, otherwise the first error in
/// registration order. Join failures (a job panicked or was aborted) are
/// reported as [`JobError::Fail`].
pub(crate) async fn run_all(jobs: &[JobRef]) -> Result<(), JobError> {
    let handles: Vec<JoinHandle<Result<(), JobError>>> = jobs
        .iter()
        .map(|job| {
            let job = JobRef::clone(job);
            tokio::spawn(async move { job.run().await })
        })
        .collect();

    let mut first_err: Option<JobError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                first_err.get_or_insert(e);
            }
            Err(join_err) => {
                first_err.get_or_insert(JobError::fail(format!("job panicked: {join_err}")));
            }
        }
    }

    match first_err {
        None => Ok(()),
        Some(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobFn;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_job(hits: &Arc<AtomicUsize>) -> JobRef {
        let hits = Arc::clone(hits);
        JobFn::arc(move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_all_jobs_run_to_completion() {
        let hits = Arc::new(AtomicUsize::new(0));
        let jobs: Vec<JobRef> = (0..5).map(|_| counting_job(&hits)).collect();
        run_all(&jobs).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_first_error_in_order_wins() {
        let jobs: Vec<JobRef> = vec![
            JobFn::arc(|| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(JobError::fail("slow"))
            }),
            JobFn::arc(|| async { Err(JobError::fail("fast")) }),
        ];
        // "fast" fails first in time, but "slow" comes first in order.
        let err = run_all(&jobs).await.unwrap_err();
        assert!(matches!(err, JobError::Fail { ref error } if error == "slow"));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let hits = Arc::new(AtomicUsize::new(0));
        let jobs: Vec<JobRef> = vec![
            JobFn::arc(|| async { Err(JobError::fail("boom")) }),
            counting_job(&hits),
        ];
        assert!(run_all(&jobs).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_job_is_converted() {
        let jobs: Vec<JobRef> = vec![JobFn::arc(|| async { panic!("job blew up") })];
        let err = run_all(&jobs).await.unwrap_err();
        assert_eq!(err.as_label(), "job_failed");
    }

    #[tokio::test]
    async fn test_empty_job_list_is_ok() {
        assert!(run_all(&[]).await.is_ok());
    }
}

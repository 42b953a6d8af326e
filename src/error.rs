//! Error types used by jobs running under the barrier.
//!
//! A failing job never brings the barrier down: the group runner absorbs
//! every [`JobError`] and converts it into a cancelled outcome for that one
//! group. The type exists so jobs have a uniform `Result` surface and so
//! subscribers can log a stable label per failure class.

use thiserror::Error;

/// # Errors produced by job execution.
///
/// Raised by individual jobs inside a group. The group runner converts any
/// of these into a `GroupCancelled` outcome; they are never surfaced to the
/// barrier or its caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// The job's own computation failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The job observed its cancellation request and exited cooperatively.
    #[error("job cancelled")]
    Canceled,
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rendergate::JobError;
    ///
    /// let err = JobError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "job_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Canceled => "job_canceled",
        }
    }

    /// Builds a `Fail` from anything printable.
    pub fn fail(error: impl Into<String>) -> Self {
        JobError::Fail {
            error: error.into(),
        }
    }
}

//! # Job-groups: the unit of admission.
//!
//! A [`JobGroup`] bundles an ordered sequence of jobs under one [`Token`].
//! Groups are created when a registration request arrives and are immutable
//! from then on; conceptually a group is destroyed the moment its runner
//! reports an outcome.

use crate::jobs::job::JobRef;
use crate::jobs::token::Token;

/// One job-group: a token plus the jobs registered under it.
///
/// All jobs in a group complete together or the group is abandoned
/// together; there is no ordering guarantee among them beyond that.
///
/// ## Example
/// ```
/// use rendergate::{JobFn, JobGroup, JobError};
///
/// let group = JobGroup::new(vec![
///     JobFn::arc(|| async { Ok::<(), JobError>(()) }),
///     JobFn::arc(|| async { Ok::<(), JobError>(()) }),
/// ]);
/// assert_eq!(group.jobs().len(), 2);
/// ```
#[derive(Clone)]
pub struct JobGroup {
    token: Token,
    jobs: Vec<JobRef>,
}

impl JobGroup {
    /// Creates a group with a freshly generated token.
    pub fn new(jobs: Vec<JobRef>) -> Self {
        Self {
            token: Token::generate(),
            jobs,
        }
    }

    /// Creates a group under a caller-supplied token.
    ///
    /// Tokens must be unique by construction; a duplicate does not corrupt
    /// the barrier but wastes a redundant runner.
    pub fn with_token(token: Token, jobs: Vec<JobRef>) -> Self {
        Self { token, jobs }
    }

    /// Returns the group's token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns the group's jobs in registration order.
    pub fn jobs(&self) -> &[JobRef] {
        &self.jobs
    }
}

impl std::fmt::Debug for JobGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobGroup")
            .field("token", &self.token)
            .field("jobs", &self.jobs.len())
            .finish()
    }
}

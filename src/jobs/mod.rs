//! # Job abstractions and group definitions.
//!
//! This module provides the core job-related types:
//! - [`Job`] — trait for implementing opaque async jobs
//! - [`Cancellable`] — optional capability for jobs that can stop early
//! - [`JobFn`] / [`CancellableFn`] — closure-backed implementations
//! - [`JobRef`] — shared reference to a job (`Arc<dyn Job>`)
//! - [`JobGroup`] — jobs registered together under one [`Token`]

mod group;
mod job;
mod job_fn;
mod token;

pub use group::JobGroup;
pub use job::{Cancellable, Job, JobRef};
pub use job_fn::{CancellableFn, JobFn};
pub use token::Token;

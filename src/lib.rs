//! # rendergate
//!
//! **Rendergate** is a completion barrier for server-side rendering data
//! loading.
//!
//! A UI tree starts rendering and, as it renders, registers groups of
//! asynchronous data-loading jobs tagged with a unique token. The page
//! renderer must block only until every currently-registered group has
//! finished (or been cancelled), then re-render with the loaded data.
//! Rendergate is the engine for that wait: it admits dynamically-arriving
//! job-groups during a bounded window, races each group against
//! cancellation and a deadline, and releases the caller exactly when the
//! set of in-flight groups drains to empty.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   JobGroup   │   │   JobGroup   │   │   JobGroup   │
//!     │  (token #1)  │   │  (token #2)  │   │  (token #3)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ submit           ▼ submit           ▼ submit
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Barrier (coordination loop)                                      │
//! │  - Bus (broadcast events)                                         │
//! │  - AdmissionWindow (bounded registration span)                    │
//! │  - PendingSet (tokens still in flight; single-owner, lock-free)   │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ GroupRunner  │   │ GroupRunner  │   │ GroupRunner  │
//!     │ (3-way race) │   │ (3-way race) │   │ (3-way race) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ GroupFinished /  │                  │
//!      │ GroupCancelled   │                  │
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Barrier::run()
//!   ├─► Admitting: accept GroupRegistered until the window elapses or an
//!   │   explicit close arrives; each admitted group gets its own runner
//!   │     runner races:  all jobs finished
//!   │                vs. its cancel line (tripped on GroupCancelled)
//!   │                vs. per-group deadline (disabled when hosted)
//!   ├─► Draining: wait for the pending set to empty (RegistryEmpty)
//!   └─► Closed: tear down lingering runners, flush subscribers, release
//!       caller
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Barrier**       | Admit, race, and drain job-groups for one request.            | [`Barrier`], [`BarrierHandle`]           |
//! | **Jobs**          | Opaque async work units, optionally cancellable.              | [`Job`], [`Cancellable`], [`JobFn`], [`CancellableFn`] |
//! | **Groups**        | Jobs registered together under one token.                     | [`JobGroup`], [`Token`]                  |
//! | **Subscriber API**| Hook into barrier events (logging, metrics, custom).          | [`Subscribe`]                            |
//! | **Configuration** | Admission window, group budget, hosted context.               | [`BarrierConfig`], [`AdmissionClock`]    |
//! | **Errors**        | Typed job failures, absorbed at the runner boundary.          | [`JobError`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use rendergate::{Barrier, BarrierConfig, JobError, JobFn, JobGroup};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = BarrierConfig::default();
//!     cfg.admission_timeout = Duration::from_millis(100);
//!
//!     let barrier = Barrier::builder(cfg).build();
//!     let handle = barrier.handle();
//!
//!     // One data-loading job that bumps a shared counter.
//!     let loaded = Arc::new(AtomicUsize::new(0));
//!     let job = {
//!         let loaded = Arc::clone(&loaded);
//!         JobFn::arc(move || {
//!             let loaded = Arc::clone(&loaded);
//!             async move {
//!                 loaded.fetch_add(1, Ordering::SeqCst);
//!                 Ok::<(), JobError>(())
//!             }
//!         })
//!     };
//!
//!     // Registered before (or while) the barrier runs; the admission
//!     // window picks it up either way.
//!     handle.submit(JobGroup::new(vec![job]));
//!
//!     // Resolves once the group finishes and the window closes.
//!     barrier.run().await;
//!     assert_eq!(loaded.load(Ordering::SeqCst), 1);
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod jobs;
mod subscribers;

// ---- Public re-exports ----

pub use config::{AdmissionClock, BarrierConfig};
pub use crate::core::{Barrier, BarrierBuilder, BarrierHandle};
pub use error::JobError;
pub use events::{Event, EventKind};
pub use jobs::{Cancellable, CancellableFn, Job, JobFn, JobGroup, JobRef, Token};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

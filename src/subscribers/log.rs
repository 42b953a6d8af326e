//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [registered] token=8f9a…
//! [admitted] token=8f9a…
//! [finished] token=8f9a…
//! [job-failed] token=8f9a… err="execution failed: boom"
//! [group-timeout] token=8f9a… timeout_ms=5000
//! [cancelled] token=8f9a… reason="deadline"
//! [registry-empty]
//! [admission-timeout]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use — implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::GroupRegistered => {
                println!("[registered] token={:?}", e.token);
            }
            EventKind::GroupAdmitted => {
                println!("[admitted] token={:?}", e.token);
            }
            EventKind::GroupFinished => {
                println!("[finished] token={:?}", e.token);
            }
            EventKind::GroupCancelled => {
                println!("[cancelled] token={:?} reason={:?}", e.token, e.reason);
            }
            EventKind::GroupTimedOut => {
                println!("[group-timeout] token={:?} timeout_ms={:?}", e.token, e.timeout_ms);
            }
            EventKind::JobFailed => {
                println!("[job-failed] token={:?} err={:?}", e.token, e.reason);
            }
            EventKind::RegistryEmpty => {
                println!("[registry-empty]");
            }
            EventKind::AdmissionCloseRequested => {
                println!("[admission-close]");
            }
            EventKind::AdmissionTimedOut => {
                println!("[admission-timeout]");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                println!("[subscriber-diag] reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

//! End-to-end barrier behavior: admission window, draining, cancellation,
//! and the hosted-context variant. All tests run on a paused tokio clock,
//! so sleeps are virtual and timing assertions are deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use rendergate::{
    AdmissionClock, Barrier, BarrierConfig, CancellableFn, Event, EventKind, JobError, JobFn,
    JobGroup, JobRef, Subscribe, Token,
};

/// Records every delivered event kind for post-run assertions.
#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

impl Recorder {
    fn count(&self, kind: EventKind) -> usize {
        self.kinds.lock().unwrap().iter().filter(|k| **k == kind).count()
    }
}

fn counting_job(counter: &Arc<AtomicUsize>) -> JobRef {
    let counter = Arc::clone(counter);
    JobFn::arc(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// A job that never resolves and exposes no cancellation capability.
fn hung_job() -> JobRef {
    JobFn::arc(|| async {
        std::future::pending::<()>().await;
        Ok(())
    })
}

fn cfg(admission: Duration, group: Duration) -> BarrierConfig {
    BarrierConfig {
        admission_timeout: admission,
        group_timeout: group,
        ..BarrierConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_groups_close_at_admission_timeout() {
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5))).build();

    let start = Instant::now();
    barrier.run().await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(1), "closed early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1100), "waited too long: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_explicit_close_short_circuits_window() {
    let barrier = Barrier::builder(cfg(Duration::from_secs(10), Duration::from_secs(5))).build();
    let handle = barrier.handle();

    tokio::spawn(async move {
        time::sleep(Duration::from_millis(100)).await;
        handle.close();
    });

    let start = Instant::now();
    barrier.run().await;
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_finished_groups_do_not_delay_close() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        handle.submit(JobGroup::new(vec![counting_job(&loaded)]));
    }

    let start = Instant::now();
    barrier.run().await;
    let elapsed = start.elapsed();

    // The window runs its full (fixed) duration; draining adds nothing
    // because all three groups finished during admission.
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2), "waited on group timeout: {elapsed:?}");
    assert_eq!(loaded.load(Ordering::SeqCst), 3);

    assert_eq!(recorder.count(EventKind::GroupAdmitted), 3);
    assert_eq!(recorder.count(EventKind::GroupFinished), 3);
    assert_eq!(recorder.count(EventKind::AdmissionTimedOut), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_group_does_not_contribute() {
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5))).build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    let delayed = {
        let loaded = Arc::clone(&loaded);
        CancellableFn::arc(move |ctx: CancellationToken| {
            let loaded = Arc::clone(&loaded);
            async move {
                tokio::select! {
                    _ = ctx.cancelled() => Err(JobError::Canceled),
                    _ = time::sleep(Duration::from_millis(100)) => {
                        loaded.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            }
        })
    };

    handle.submit(JobGroup::with_token(Token::from("a"), vec![counting_job(&loaded)]));
    handle.submit(JobGroup::with_token(Token::from("b"), vec![counting_job(&loaded)]));
    handle.submit(JobGroup::with_token(Token::from("c"), vec![delayed]));

    let done = tokio::spawn(barrier.run());

    // Let admission start the runners, then cancel `c` before its job has
    // had a chance to run (it only fires at +100ms).
    time::sleep(Duration::from_millis(10)).await;
    handle.cancel(&Token::from("c"));

    done.await.unwrap();
    assert_eq!(loaded.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_right_after_submit_is_not_lost() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    let job = {
        let loaded = Arc::clone(&loaded);
        CancellableFn::arc(move |ctx: CancellationToken| {
            let loaded = Arc::clone(&loaded);
            async move {
                tokio::select! {
                    _ = ctx.cancelled() => Err(JobError::Canceled),
                    _ = time::sleep(Duration::from_millis(100)) => {
                        loaded.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            }
        })
    };
    handle.submit(JobGroup::with_token(Token::from("early"), vec![job]));
    // Enqueued before the coordination loop has even seen the registration;
    // the cancel line makes it stick regardless.
    handle.cancel(&Token::from("early"));

    barrier.run().await;

    assert_eq!(loaded.load(Ordering::SeqCst), 0, "job ran despite the cancel");
    assert_eq!(recorder.count(EventKind::GroupFinished), 0);
    // The external request plus the runner's reported outcome.
    assert_eq!(recorder.count(EventKind::GroupCancelled), 2);
}

#[tokio::test(start_paused = true)]
async fn test_hung_group_force_cancelled_at_group_timeout() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(2)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    handle.submit(JobGroup::with_token(Token::from("hung"), vec![hung_job()]));

    let start = Instant::now();
    barrier.run().await;
    let elapsed = start.elapsed();

    // Admission closes at 1s; the group's own 2s budget (measured from
    // admission) expires at ~2s and unblocks the drain.
    assert!(elapsed >= Duration::from_secs(2), "no force-cancel: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3));

    assert_eq!(recorder.count(EventKind::GroupTimedOut), 1);
    assert_eq!(recorder.count(EventKind::GroupCancelled), 1);
    assert_eq!(recorder.count(EventKind::GroupFinished), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hosted_context_waits_for_explicit_cancel() {
    let mut config = cfg(Duration::from_secs(1), Duration::from_secs(2));
    config.hosted = true;
    let barrier = Barrier::builder(config).build();
    let handle = barrier.handle();

    handle.submit(JobGroup::with_token(Token::from("hung"), vec![hung_job()]));

    let canceler = handle.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(5)).await;
        canceler.cancel(&Token::from("hung"));
    });

    let start = Instant::now();
    barrier.run().await;
    let elapsed = start.elapsed();

    // Well past the 2s group budget: hosted contexts never force-cancel.
    assert!(elapsed >= Duration::from_secs(5), "deadline fired anyway: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_registration_after_close_is_ignored() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(10)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    // Keeps the barrier draining until ~2s.
    let loaded = Arc::new(AtomicUsize::new(0));
    let slow = {
        let loaded = Arc::clone(&loaded);
        JobFn::arc(move || {
            let loaded = Arc::clone(&loaded);
            async move {
                time::sleep(Duration::from_secs(2)).await;
                loaded.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    };
    handle.submit(JobGroup::with_token(Token::from("slow"), vec![slow]));

    let late = handle.clone();
    let late_counter = Arc::clone(&loaded);
    tokio::spawn(async move {
        // Window closed at 1s; this lands mid-drain.
        time::sleep(Duration::from_millis(1500)).await;
        late.submit(JobGroup::new(vec![counting_job(&late_counter)]));
    });

    barrier.run().await;

    assert_eq!(loaded.load(Ordering::SeqCst), 1, "late group must not run");
    assert_eq!(recorder.count(EventKind::GroupAdmitted), 1);
    assert_eq!(recorder.count(EventKind::RegistryEmpty), 1);
}

#[tokio::test(start_paused = true)]
async fn test_double_cancel_drains_once() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(30)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    handle.submit(JobGroup::with_token(Token::from("a"), vec![hung_job()]));
    handle.submit(JobGroup::with_token(Token::from("b"), vec![hung_job()]));

    let canceler = handle.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(1200)).await;
        canceler.cancel(&Token::from("a"));
        canceler.cancel(&Token::from("a")); // duplicate: single removal
        canceler.cancel(&Token::from("b"));
    });

    let start = Instant::now();
    barrier.run().await;
    assert!(start.elapsed() < Duration::from_secs(2));

    assert_eq!(recorder.count(EventKind::RegistryEmpty), 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_token_registrations_drain_once() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    handle.submit(JobGroup::with_token(Token::from("dup"), vec![counting_job(&loaded)]));
    handle.submit(JobGroup::with_token(Token::from("dup"), vec![counting_job(&loaded)]));

    let start = Instant::now();
    barrier.run().await;

    // Both runners execute; the redundant outcome is an idempotent removal,
    // so the drain transition still fires exactly once and nothing hangs.
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(loaded.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.count(EventKind::GroupAdmitted), 2);
    assert_eq!(recorder.count(EventKind::GroupFinished), 2);
    assert_eq!(recorder.count(EventKind::RegistryEmpty), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_group_is_never_admitted() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_millis(500), Duration::from_secs(5)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    handle.submit(JobGroup::new(Vec::new()));

    let start = Instant::now();
    barrier.run().await;
    assert!(start.elapsed() >= Duration::from_millis(500));

    assert_eq!(recorder.count(EventKind::GroupAdmitted), 0);
    assert_eq!(recorder.count(EventKind::RegistryEmpty), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_clock_extends_admission() {
    let mut config = cfg(Duration::from_secs(1), Duration::from_secs(5));
    config.admission_clock = AdmissionClock::RestartOnRegister;
    let barrier = Barrier::builder(config).build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    let late = handle.clone();
    let late_counter = Arc::clone(&loaded);
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(600)).await;
        late.submit(JobGroup::new(vec![counting_job(&late_counter)]));
    });

    let start = Instant::now();
    barrier.run().await;
    let elapsed = start.elapsed();

    // The 600ms registration restarts the clock: close at ~1.6s.
    assert!(elapsed >= Duration::from_millis(1600), "clock not restarted: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2));
    assert_eq!(loaded.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_job_cancels_only_its_group() {
    let recorder = Arc::new(Recorder::default());
    let barrier = Barrier::builder(cfg(Duration::from_secs(1), Duration::from_secs(5)))
        .with_subscribers(vec![recorder.clone()])
        .build();
    let handle = barrier.handle();

    let loaded = Arc::new(AtomicUsize::new(0));
    handle.submit(JobGroup::with_token(Token::from("ok"), vec![counting_job(&loaded)]));
    handle.submit(JobGroup::with_token(
        Token::from("bad"),
        vec![JobFn::arc(|| async { Err(JobError::fail("boom")) })],
    ));

    let start = tokio::time::Instant::now();
    barrier.run().await;

    // The failure degrades to one cancelled group; the barrier still
    // closes right after the window and the healthy group completes.
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(loaded.load(Ordering::SeqCst), 1);

    assert_eq!(recorder.count(EventKind::JobFailed), 1);
    assert_eq!(recorder.count(EventKind::GroupCancelled), 1);
    assert_eq!(recorder.count(EventKind::GroupFinished), 1);
}

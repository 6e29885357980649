use async_trait::async_trait;
use nestscan_detect::{BoundingBox, Detection, Detector, ImageFile};
use nestscan_view::{DetectionSession, Phase, ViewError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Detector whose answers are numbered per call; the first call blocks
/// until released so completion order can be scripted out of sequence.
struct SequencedDetector {
    calls: AtomicUsize,
    first_call_gate: Arc<Notify>,
}

impl SequencedDetector {
    fn new(first_call_gate: Arc<Notify>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            first_call_gate,
        }
    }

    async fn answer(&self) -> Detection {
        let sequence = self.calls.fetch_add(1, Ordering::SeqCst);
        if sequence == 0 {
            self.first_call_gate.notified().await;
        }
        Detection::Found {
            position: BoundingBox {
                x1: sequence as i64,
                y1: 0,
                x2: sequence as i64 + 10,
                y2: 10,
            },
        }
    }
}

#[async_trait]
impl Detector for SequencedDetector {
    async fn detect_url(&self, _url: &str) -> Detection {
        self.answer().await
    }

    async fn detect_file(&self, _file: &ImageFile) -> Detection {
        self.answer().await
    }
}

fn sequence_of(detection: &Detection) -> i64 {
    detection.position().expect("sequenced results are Found").x1
}

#[tokio::test]
async fn submission_while_busy_is_rejected_not_queued() {
    let gate = Arc::new(Notify::new());
    let session = Arc::new(DetectionSession::new(Arc::new(SequencedDetector::new(
        gate.clone(),
    ))));

    let mut state = session.subscribe();
    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_url("https://example.com/first.jpg").await })
    };
    state.wait_for(|s| s.phase == Phase::Busy).await.unwrap();

    for _ in 0..3 {
        let rejected = session.submit_url("https://example.com/again.jpg").await;
        assert!(matches!(rejected, Err(ViewError::Busy)));
    }

    gate.notify_one();
    let detection = first.await.unwrap().unwrap();
    assert_eq!(sequence_of(&detection), 0);

    // Exactly one settled result for the one accepted submission
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Settled);
    assert_eq!(sequence_of(snapshot.result.as_ref().unwrap()), 0);
}

#[tokio::test]
async fn out_of_order_completion_never_overwrites_newer_result() {
    let gate = Arc::new(Notify::new());
    let session = Arc::new(DetectionSession::new(Arc::new(SequencedDetector::new(
        gate.clone(),
    ))));

    // First submission hangs at the detector
    let mut state = session.subscribe();
    let stale = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_url("https://example.com/old.jpg").await })
    };
    state.wait_for(|s| s.phase == Phase::Busy).await.unwrap();

    // Supersede it, then run a second submission to completion
    session.reset();
    let newer = session.submit_url("https://example.com/new.jpg").await.unwrap();
    assert_eq!(sequence_of(&newer), 1);
    assert_eq!(
        sequence_of(session.snapshot().result.as_ref().unwrap()),
        1
    );

    // Now let the first request finish late; its result must be discarded
    gate.notify_one();
    let stale_result = stale.await.unwrap().unwrap();
    assert_eq!(sequence_of(&stale_result), 0);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Settled);
    assert_eq!(sequence_of(snapshot.result.as_ref().unwrap()), 1);
}

#[tokio::test]
async fn reset_while_busy_leaves_idle_after_late_completion() {
    let gate = Arc::new(Notify::new());
    let session = Arc::new(DetectionSession::new(Arc::new(SequencedDetector::new(
        gate.clone(),
    ))));

    let mut state = session.subscribe();
    let inflight = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_url("https://example.com/a.jpg").await })
    };
    state.wait_for(|s| s.phase == Phase::Busy).await.unwrap();

    session.reset();
    gate.notify_one();
    inflight.await.unwrap().unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.result.is_none());
}

#[tokio::test]
async fn sequential_submissions_each_settle_in_order() {
    // No gating after the first call; run first to completion immediately.
    let gate = Arc::new(Notify::new());
    gate.notify_one();
    let session = DetectionSession::new(Arc::new(SequencedDetector::new(gate)));

    for expected in 0..4 {
        let detection = session.submit_url("https://example.com/x.jpg").await.unwrap();
        assert_eq!(sequence_of(&detection), expected);
        assert_eq!(session.snapshot().phase, Phase::Settled);
    }
}

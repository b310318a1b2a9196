mod common;

use std::sync::Arc;

use common::{segments, shared, MockBackend};
use shotlist_sequence_engine::queue::{
    JobOutcome, JobStatus, RenderControls, RenderEvent, RenderMode, RenderSubmission,
    SubmitOutcome,
};
use shotlist_sequence_engine::BusyIndicator;
use shotlist_sequence_model::{RenderData, RenderParams, Segment, TaskDetail};

fn submission(mode: RenderMode, segs: Vec<Segment>) -> RenderSubmission {
    RenderSubmission::new(mode, Arc::new(segs), &RenderParams::default(), None).unwrap()
}

fn queued(outcome: SubmitOutcome) -> shotlist_sequence_engine::queue::JobTicket {
    match outcome {
        SubmitOutcome::Queued(ticket) => ticket,
        SubmitOutcome::Cached { url } => panic!("unexpected cache hit: {url}"),
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn cache_hit_makes_zero_network_calls() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (backend, dynamic) = shared(backend);
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");

    let segs = segments(&[2.0, 3.0]);
    let ticket = queued(controls.submit(submission(RenderMode::Preview, segs.clone())).await.unwrap());
    renders.recv().await.unwrap().succeed("https://cdn.test/a.mp4");
    assert_eq!(
        ticket.wait().await,
        JobOutcome::Succeeded {
            url: Some("https://cdn.test/a.mp4".into())
        }
    );

    let again = controls.submit(submission(RenderMode::Preview, segs)).await.unwrap();
    match again {
        SubmitOutcome::Cached { url } => assert_eq!(url, "https://cdn.test/a.mp4"),
        SubmitOutcome::Queued(_) => panic!("expected cache hit"),
    }
    assert_eq!(backend.renders(), 1);
    assert_eq!(controls.last_preview_url().as_deref(), Some("https://cdn.test/a.mp4"));
}

#[tokio::test]
async fn full_renders_are_never_cached() {
    let (backend, dynamic) = shared(MockBackend::new(Vec::new(), TaskDetail::default()));
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");
    let segs = segments(&[2.0]);

    for _ in 0..2 {
        let ticket = queued(controls.submit(submission(RenderMode::Full, segs.clone())).await.unwrap());
        assert!(matches!(ticket.wait().await, JobOutcome::Succeeded { url: Some(_) }));
    }
    assert_eq!(backend.renders(), 2);
    assert_eq!(controls.state().cached, 0);
}

#[tokio::test]
async fn single_flight_with_fifo_terminal_order() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (backend, dynamic) = shared(backend);
    let (controls, mut events) = RenderControls::spawn(dynamic, "task-1");

    let all = segments(&[1.0, 2.0, 3.0]);
    let a = queued(controls.submit(submission(RenderMode::Preview, all[..1].to_vec())).await.unwrap());
    let b = queued(controls.submit(submission(RenderMode::Full, all.clone())).await.unwrap());
    let c = queued(controls.submit(submission(RenderMode::Single, all[2..].to_vec())).await.unwrap());
    assert_eq!((a.position, b.position, c.position), (0, 1, 2));

    let first = renders.recv().await.unwrap();
    settle().await;
    assert!(renders.try_recv().is_err(), "second job started while first running");
    assert_eq!(backend.renders(), 1);
    assert_eq!(first.segments.len(), 1);

    first.succeed("https://cdn.test/a.mp4");
    let second = renders.recv().await.unwrap();
    assert!(!second.preview);
    assert_eq!(second.segments.len(), 3);
    second.succeed("https://cdn.test/b.mp4");
    let third = renders.recv().await.unwrap();
    assert!(third.preview);
    third.succeed("https://cdn.test/c.mp4");

    let c_job_id = c.job_id;
    assert!(matches!(c.wait().await, JobOutcome::Succeeded { .. }));

    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let RenderEvent::Completed { job_id, .. } = event {
            completed.push(job_id);
        }
    }
    assert_eq!(completed, vec![a.job_id, b.job_id, c_job_id]);
}

#[tokio::test]
async fn cancel_aborts_running_job_and_advances() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (_backend, dynamic) = shared(backend);
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");
    let busy = BusyIndicator::new();
    controls.set_busy_indicator(busy.clone()).unwrap();

    let segs = segments(&[1.0, 2.0]);
    let a = queued(controls.submit(submission(RenderMode::Full, segs.clone())).await.unwrap());
    let b = queued(controls.submit(submission(RenderMode::Preview, segs)).await.unwrap());

    let first = renders.recv().await.unwrap();
    assert_eq!(busy.depth(), 1);
    assert!(controls.cancel().await.unwrap());
    assert!(first.is_abandoned());
    assert_eq!(a.wait().await, JobOutcome::Cancelled);

    let second = renders.recv().await.unwrap();
    assert_eq!(second.index, 1);
    assert_eq!(busy.depth(), 1, "only the running job holds the indicator");
    second.succeed("https://cdn.test/b.mp4");
    assert!(matches!(b.wait().await, JobOutcome::Succeeded { .. }));
    assert!(!busy.is_busy());

    let mut state = controls.watch_state();
    let state = state.wait_for(|s| !s.is_rendering()).await.unwrap().clone();
    assert!(state.last_failed.is_none(), "cancellation is not a failure");
    assert!(!controls.cancel().await.unwrap());
}

#[tokio::test]
async fn failure_is_retained_and_retried_verbatim() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (backend, dynamic) = shared(backend);
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");
    let busy = BusyIndicator::new();
    controls.set_busy_indicator(busy.clone()).unwrap();

    assert!(controls.retry_last_failed().await.unwrap().is_none());

    let segs = segments(&[1.5, 2.5]);
    let ticket = queued(controls.submit(submission(RenderMode::Preview, segs.clone())).await.unwrap());
    let first = renders.recv().await.unwrap();
    let sent = first.segments.clone();
    first.fail("connection reset");
    match ticket.wait().await {
        JobOutcome::Failed { retryable, error } => {
            assert!(retryable);
            assert!(error.contains("connection reset"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    settle().await;
    assert_eq!(backend.renders(), 1, "failures are never retried automatically");
    let mut watch = controls.watch_state();
    let failed = watch
        .wait_for(|s| s.last_failed.is_some())
        .await
        .unwrap()
        .last_failed
        .clone()
        .unwrap();
    assert_eq!(failed.job.mode, RenderMode::Preview);
    assert_eq!(failed.job.status, JobStatus::Failed);
    assert!(!busy.is_busy(), "a failed job releases the indicator");
    assert_eq!(failed.job.segments.as_slice(), segs.as_slice());

    let retry = controls.retry_last_failed().await.unwrap().unwrap();
    let second = renders.recv().await.unwrap();
    assert_eq!(second.segments, sent);
    assert!(second.preview);
    second.succeed("https://cdn.test/retry.mp4");
    assert!(matches!(retry.wait().await, JobOutcome::Succeeded { .. }));

    let state = watch
        .wait_for(|s| s.last_preview_url.is_some())
        .await
        .unwrap()
        .clone();
    assert_eq!(state.last_preview_url.as_deref(), Some("https://cdn.test/retry.mp4"));
    assert!(state.last_failed.is_none());
}

#[tokio::test]
async fn missing_artifact_is_not_cached() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (backend, dynamic) = shared(backend);
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");
    let segs = segments(&[1.0]);

    let ticket = queued(controls.submit(submission(RenderMode::Preview, segs.clone())).await.unwrap());
    renders.recv().await.unwrap().respond(RenderData::default());
    assert_eq!(ticket.wait().await, JobOutcome::Succeeded { url: None });

    let again = queued(controls.submit(submission(RenderMode::Preview, segs)).await.unwrap());
    renders.recv().await.unwrap().succeed("https://cdn.test/late.mp4");
    assert!(matches!(again.wait().await, JobOutcome::Succeeded { url: Some(_) }));
    assert_eq!(backend.renders(), 2);
}

#[tokio::test]
async fn queued_duplicate_is_served_from_cache_when_it_starts() {
    let (backend, mut renders) = MockBackend::gated(Vec::new(), TaskDetail::default());
    let (backend, dynamic) = shared(backend);
    let (controls, _events) = RenderControls::spawn(dynamic, "task-1");
    let segs = segments(&[1.0, 1.0]);

    let first = queued(controls.submit(submission(RenderMode::Preview, segs.clone())).await.unwrap());
    let duplicate = queued(controls.submit(submission(RenderMode::Preview, segs)).await.unwrap());
    renders.recv().await.unwrap().succeed("https://cdn.test/same.mp4");

    assert!(matches!(first.wait().await, JobOutcome::Succeeded { .. }));
    assert_eq!(
        duplicate.wait().await,
        JobOutcome::Succeeded {
            url: Some("https://cdn.test/same.mp4".into())
        }
    );
    assert_eq!(backend.renders(), 1);
}

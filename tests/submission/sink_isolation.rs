use std::sync::Arc;

use napilsa::{
    sink::{HttpSinkNotifier, SinkNotifier, SinkOutcome, SinkTarget},
    submission::SubmissionState,
    testing::{HookAnalysis, RecordingSink, StubHttpServer, sample_evaluation, sample_input},
};

use crate::orchestrator;

async fn assert_reviewing_regardless_of(sink: Arc<dyn SinkNotifier>) {
    let analysis = Arc::new(HookAnalysis::succeeding(sample_evaluation()));
    let orchestrator = orchestrator(analysis, sink);
    orchestrator.edit(sample_input()).expect("editing is allowed");

    let evaluation = orchestrator
        .submit()
        .await
        .expect("sink outcome must not affect the cycle");
    assert_eq!(evaluation, sample_evaluation());

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.state(), SubmissionState::Reviewing);
    assert_eq!(snapshot.evaluation(), Some(&sample_evaluation()));
}

#[tokio::test]
async fn reported_sink_outcomes_do_not_matter() {
    for outcome in [
        SinkOutcome::Delivered { status: 200 },
        SinkOutcome::Skipped,
        SinkOutcome::Failed {
            reason: "sink returned status 500".to_string(),
        },
    ] {
        assert_reviewing_regardless_of(Arc::new(RecordingSink::new(outcome))).await;
    }
}

#[tokio::test]
async fn stalled_sink_does_not_hold_the_result() {
    let sink = Arc::new(RecordingSink::stalled());
    assert_reviewing_regardless_of(sink.clone()).await;
    sink.wait_for_records(1).await;
}

#[tokio::test]
async fn http_sink_error_status_does_not_matter() {
    let server = StubHttpServer::spawn(500, "Internal Server Error").await;
    let sink = HttpSinkNotifier::new(SinkTarget::new(server.url("/macros/s/test/exec")))
        .expect("sink should build");
    assert_reviewing_regardless_of(Arc::new(sink)).await;
}

#[tokio::test]
async fn unreachable_http_sink_does_not_matter() {
    let sink = HttpSinkNotifier::new(SinkTarget::new("http://127.0.0.1:9/exec"))
        .expect("sink should build");
    assert_reviewing_regardless_of(Arc::new(sink)).await;
}

#[tokio::test]
async fn missing_sink_target_does_not_matter() {
    let sink = HttpSinkNotifier::new(None).expect("sink should build");
    assert_reviewing_regardless_of(Arc::new(sink)).await;
}

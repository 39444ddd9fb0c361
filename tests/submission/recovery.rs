use std::{sync::Arc, time::Duration};

use napilsa::{
    analysis::{
        AnalysisClient, AnalysisConfig, AnalysisError, BackendDialect, CredentialRef,
        EnvCredentialProvider,
    },
    evaluation::ReflectionInput,
    submission::{SubmissionConfig, SubmissionOrchestrator, SubmissionState, SubmitError},
    testing::{HookAnalysis, RecordingSink, StubHttpServer, sample_evaluation, sample_input},
};
use serde_json::json;

use crate::{failing_analysis, orchestrator};

#[tokio::test(start_paused = true)]
async fn failed_cycle_restores_input_after_three_seconds() {
    let sink = Arc::new(RecordingSink::delivering());
    let orchestrator = orchestrator(failing_analysis(), sink);
    let input = ReflectionInput::new("1-1 홍길동", "인상 깊은 문장", "오늘 배운 내용은...");
    orchestrator.edit(input.clone()).expect("editing is allowed");

    let err = orchestrator
        .submit()
        .await
        .expect_err("analysis failure must surface");
    assert!(matches!(err, SubmitError::AnalysisFailed));
    assert_eq!(orchestrator.state(), SubmissionState::Failed);
    assert!(orchestrator.snapshot().evaluation().is_none());

    assert!(matches!(
        orchestrator.submit().await,
        Err(SubmitError::Busy(SubmissionState::Failed))
    ));
    assert!(matches!(
        orchestrator.edit(ReflectionInput::default()),
        Err(SubmitError::NotEditable(SubmissionState::Failed))
    ));
    assert!(matches!(
        orchestrator.reset(),
        Err(SubmitError::NotEditable(SubmissionState::Failed))
    ));

    tokio::time::sleep(Duration::from_millis(2_900)).await;
    assert_eq!(orchestrator.state(), SubmissionState::Failed);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.state(), SubmissionState::Editing);
    assert_eq!(snapshot.input(), &input);
    assert!(snapshot.evaluation().is_none());
}

#[tokio::test(start_paused = true)]
async fn recovery_delay_is_configurable_and_cycle_can_retry() {
    let analysis = Arc::new(HookAnalysis::failing(|| {
        AnalysisError::AuthenticationMissing("GEMINI_API_KEY".to_string())
    }));
    let orchestrator = SubmissionOrchestrator::new(
        analysis.clone(),
        Arc::new(RecordingSink::delivering()),
        SubmissionConfig {
            recovery_delay_ms: 500,
            ..SubmissionConfig::default()
        },
    );
    orchestrator.edit(sample_input()).expect("editing is allowed");

    for attempt in 1..=2 {
        assert!(matches!(
            orchestrator.submit().await,
            Err(SubmitError::AnalysisFailed)
        ));
        assert_eq!(orchestrator.state(), SubmissionState::Failed);
        tokio::time::sleep(Duration::from_millis(501)).await;
        assert_eq!(orchestrator.state(), SubmissionState::Editing);
        assert_eq!(analysis.calls().await.len(), attempt);
    }
    assert_eq!(orchestrator.snapshot().input(), &sample_input());
}

fn client_against(server: &StubHttpServer) -> AnalysisClient {
    AnalysisClient::new(
        AnalysisConfig {
            dialect: BackendDialect::Gemini,
            endpoint: server.url("/v1beta"),
            model: "test-model".to_string(),
            credential: CredentialRef::InlineToken {
                token: "test-token".to_string(),
            },
            request_timeout_ms: Some(5_000),
        },
        Arc::new(EnvCredentialProvider),
    )
    .expect("client should build")
}

#[tokio::test]
async fn malformed_evaluation_never_reaches_reviewing() {
    let mut missing_score = serde_json::to_value(sample_evaluation()).expect("serialize");
    missing_score
        .as_object_mut()
        .expect("evaluation is an object")
        .remove("score");
    let mut string_opinion = serde_json::to_value(sample_evaluation()).expect("serialize");
    string_opinion["oreoAnalysis"]["opinion"] = json!("yes");

    for payload in [missing_score, string_opinion] {
        let reply = json!({
            "candidates": [{ "content": { "parts": [{ "text": payload.to_string() }] } }]
        });
        let server = StubHttpServer::spawn(200, reply.to_string()).await;
        let orchestrator = orchestrator(
            Arc::new(client_against(&server)),
            Arc::new(RecordingSink::delivering()),
        );
        orchestrator.edit(sample_input()).expect("editing is allowed");

        let err = orchestrator
            .submit()
            .await
            .expect_err("malformed payload must fail the cycle");
        assert!(matches!(err, SubmitError::AnalysisFailed));
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.state(), SubmissionState::Failed);
        assert!(snapshot.evaluation().is_none());
        assert_eq!(server.requests().await.len(), 1);
    }
}

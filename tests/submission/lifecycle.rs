use std::sync::Arc;

use napilsa::{
    evaluation::{Evaluation, OreoAnalysis, ReflectionInput},
    submission::{ReflectionField, SubmissionState, SubmitError},
    testing::{Gate, HookAnalysis, RecordingSink, sample_evaluation, sample_input},
};

use crate::{orchestrator, wait_for_state};

#[tokio::test]
async fn blank_required_fields_never_leave_editing() {
    let cases = [
        ReflectionInput::new("", "", "오늘 배운 내용은..."),
        ReflectionInput::new("1-1 홍길동", "문장", ""),
        ReflectionInput::new("   ", "", "내용"),
        ReflectionInput::new("1-1", "", " \n\t"),
        ReflectionInput::default(),
    ];

    for input in cases {
        let analysis = Arc::new(HookAnalysis::succeeding(sample_evaluation()));
        let sink = Arc::new(RecordingSink::delivering());
        let orchestrator = orchestrator(analysis.clone(), sink.clone());
        orchestrator.edit(input.clone()).expect("editing is allowed");

        let err = orchestrator
            .submit()
            .await
            .expect_err("blank input must be rejected");
        assert!(matches!(err, SubmitError::Validation(_)), "{input:?}: {err}");
        assert_eq!(orchestrator.state(), SubmissionState::Editing);
        assert_eq!(orchestrator.snapshot().input(), &input);

        tokio::task::yield_now().await;
        assert!(analysis.calls().await.is_empty());
        assert!(sink.records().await.is_empty());
    }
}

#[tokio::test]
async fn example_reflection_reaches_reviewing_with_exact_evaluation() {
    let expected = Evaluation {
        summary: "협동의 중요성을 배웠다는 소감입니다.".to_string(),
        oreo_analysis: OreoAnalysis {
            opinion: true,
            reason: false,
            example: true,
            opinion_restated: false,
        },
        score: 72,
        constructive_feedback: "왜 그렇게 생각했는지 이유를 덧붙여 보세요.".to_string(),
        encouragement: "꾸준히 쓰는 모습이 멋져요!".to_string(),
    };
    let input = ReflectionInput::new("1-1 홍길동", "", "오늘 배운 내용은...");
    let gate = Gate::new();
    let analysis = Arc::new(HookAnalysis::gated(gate.clone(), expected.clone()));
    let sink = Arc::new(RecordingSink::delivering());
    let orchestrator = orchestrator(analysis.clone(), sink.clone());

    orchestrator
        .edit_field(ReflectionField::StudentInfo, "1-1 홍길동")
        .expect("editing is allowed");
    orchestrator
        .edit_field(ReflectionField::Content, "오늘 배운 내용은...")
        .expect("editing is allowed");
    assert_eq!(orchestrator.snapshot().input(), &input);

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit().await }
    });
    wait_for_state(&orchestrator, SubmissionState::Submitting).await;
    assert!(orchestrator.snapshot().evaluation().is_none());

    gate.open();
    let evaluation = running
        .await
        .expect("submit task should join")
        .expect("submission should succeed");
    assert_eq!(evaluation, expected);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.state(), SubmissionState::Reviewing);
    assert_eq!(snapshot.evaluation(), Some(&expected));
    assert_eq!(snapshot.input(), &input, "analysis must not touch the input");
    assert_eq!(analysis.calls().await, vec![input.clone()]);

    sink.wait_for_records(1).await;
    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_info, "1-1 홍길동");
    assert_eq!(records[0].impressive_phrase, "");
    assert_eq!(records[0].content, "오늘 배운 내용은...");
    assert!(records[0].form_title.ends_with("나필사"));
}

#[tokio::test]
async fn second_submit_while_submitting_is_rejected_without_io() {
    let gate = Gate::new();
    let analysis = Arc::new(HookAnalysis::gated(gate.clone(), sample_evaluation()));
    let sink = Arc::new(RecordingSink::delivering());
    let orchestrator = orchestrator(analysis.clone(), sink.clone());
    orchestrator.edit(sample_input()).expect("editing is allowed");

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit().await }
    });
    wait_for_state(&orchestrator, SubmissionState::Submitting).await;

    let err = orchestrator
        .submit()
        .await
        .expect_err("second submit must be rejected");
    assert!(matches!(err, SubmitError::Busy(SubmissionState::Submitting)));
    assert!(matches!(
        orchestrator.edit(ReflectionInput::new("x", "", "y")),
        Err(SubmitError::NotEditable(SubmissionState::Submitting))
    ));
    assert!(matches!(
        orchestrator.reset(),
        Err(SubmitError::NotEditable(SubmissionState::Submitting))
    ));

    gate.open();
    first
        .await
        .expect("submit task should join")
        .expect("first submission should succeed");

    assert_eq!(analysis.calls().await.len(), 1);
    sink.wait_for_records(1).await;
    assert_eq!(sink.records().await.len(), 1);
    assert_eq!(orchestrator.snapshot().input(), &sample_input());
}

#[tokio::test]
async fn reviewing_is_terminal_until_reset() {
    let analysis = Arc::new(HookAnalysis::succeeding(sample_evaluation()));
    let sink = Arc::new(RecordingSink::delivering());
    let orchestrator = orchestrator(analysis.clone(), sink);
    orchestrator.edit(sample_input()).expect("editing is allowed");
    orchestrator.submit().await.expect("submission should succeed");

    assert!(matches!(
        orchestrator.submit().await,
        Err(SubmitError::Busy(SubmissionState::Reviewing))
    ));
    assert!(matches!(
        orchestrator.edit_field(ReflectionField::Content, "changed"),
        Err(SubmitError::NotEditable(SubmissionState::Reviewing))
    ));
    assert_eq!(analysis.calls().await.len(), 1);
}

#[tokio::test]
async fn reset_from_reviewing_clears_everything() {
    let analysis = Arc::new(HookAnalysis::succeeding(sample_evaluation()));
    let sink = Arc::new(RecordingSink::delivering());
    let orchestrator = orchestrator(analysis.clone(), sink);
    orchestrator.edit(sample_input()).expect("editing is allowed");
    orchestrator.submit().await.expect("submission should succeed");
    assert_eq!(orchestrator.state(), SubmissionState::Reviewing);

    for _ in 0..2 {
        orchestrator.reset().expect("reset is allowed");
        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.state(), SubmissionState::Editing);
        assert_eq!(snapshot.input().student_info, "");
        assert_eq!(snapshot.input().impressive_phrase, "");
        assert_eq!(snapshot.input().content, "");
        assert!(snapshot.evaluation().is_none());
    }

    let next = ReflectionInput::new("1-2 김철수", "", "두 번째 소감");
    orchestrator.edit(next.clone()).expect("editing is allowed");
    orchestrator.submit().await.expect("second cycle should succeed");
    assert_eq!(analysis.calls().await, vec![sample_input(), next]);
}

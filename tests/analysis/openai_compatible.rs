use napilsa::{
    analysis::{AnalysisError, BackendDialect, CredentialRef},
    evaluation::Evaluation,
    testing::{sample_evaluation, sample_input},
};
use serde_json::json;

use crate::{
    client_for, evaluation_text, evaluation_text_without_score, inline_token, spawn_json,
};

fn chat_reply(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn valid_reply_becomes_evaluation() {
    let server = spawn_json(
        200,
        chat_reply(json!(evaluation_text(&sample_evaluation()))),
    )
    .await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let evaluation = client
        .analyze(&sample_input())
        .await
        .expect("analysis should succeed");
    assert_eq!(evaluation, sample_evaluation());

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.header("authorization"), Some("Bearer test-token"));

    let body = request.json();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["stream"], false);
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    let schema = &body["response_format"]["json_schema"]["schema"];
    assert_eq!(schema["additionalProperties"], false);
    assert_eq!(
        schema["required"],
        json!([
            "summary",
            "oreoAnalysis",
            "score",
            "constructiveFeedback",
            "encouragement"
        ])
    );
}

#[tokio::test]
async fn out_of_range_score_is_passed_through() {
    let evaluation = Evaluation {
        score: 140,
        ..sample_evaluation()
    };
    let server = spawn_json(200, chat_reply(json!(evaluation_text(&evaluation)))).await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let analyzed = client
        .analyze(&sample_input())
        .await
        .expect("out-of-range score is not a shape error");
    assert_eq!(analyzed.score, 140);
}

#[tokio::test]
async fn server_ignoring_strict_mode_still_yields_evaluation() {
    let mut content = serde_json::to_value(sample_evaluation()).expect("serialize");
    content["confidence"] = json!(0.9);
    content["oreoAnalysis"]["comment"] = json!("clear opinion");
    let server = spawn_json(200, chat_reply(json!(content.to_string()))).await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let evaluation = client
        .analyze(&sample_input())
        .await
        .expect("extra keys must not fail the analysis");
    assert_eq!(evaluation, sample_evaluation());
}

#[tokio::test]
async fn credential_none_sends_no_auth_and_provider_rejection_propagates() {
    let server = spawn_json(401, json!({"error": {"message": "missing api key"}})).await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        CredentialRef::None,
    );

    let err = client
        .analyze(&sample_input())
        .await
        .expect_err("401 must fail");
    assert!(matches!(err, AnalysisError::ServiceError(_)));
    assert_eq!(err.http_status(), Some(401));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].header("authorization").is_none());
}

#[tokio::test]
async fn null_content_is_empty_response() {
    let server = spawn_json(200, chat_reply(serde_json::Value::Null)).await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let err = client
        .analyze(&sample_input())
        .await
        .expect_err("null content must fail");
    assert!(matches!(err, AnalysisError::EmptyResponse));
}

#[tokio::test]
async fn missing_score_is_malformed() {
    let server = spawn_json(200, chat_reply(json!(evaluation_text_without_score()))).await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let err = client
        .analyze(&sample_input())
        .await
        .expect_err("missing score must fail");
    assert!(matches!(err, AnalysisError::MalformedResult(_)));
}

#[tokio::test]
async fn unreadable_envelope_is_service_error() {
    let server = napilsa::testing::StubHttpServer::spawn(200, "<html>gateway</html>").await;
    let client = client_for(
        BackendDialect::OpenAiCompatible,
        server.url("/v1"),
        inline_token(),
    );

    let err = client
        .analyze(&sample_input())
        .await
        .expect_err("html must fail");
    assert!(matches!(err, AnalysisError::ServiceError(_)));
    assert_eq!(err.http_status(), None);
}

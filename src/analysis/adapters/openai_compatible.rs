use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Value, json};

use crate::analysis::{
    adapters::http_common,
    error::{AnalysisError, ProtocolError},
    ports::GenerationBackend,
    types::{BackendDialect, GenerationContext, GenerationRequest},
};

const PROVIDER: &str = "openai-compatible";
const RESPONSE_SCHEMA_NAME: &str = "reflection_evaluation";

#[derive(Clone)]
pub struct OpenAiCompatibleAdapter {
    client: Client,
}

impl OpenAiCompatibleAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatibleAdapter {
    fn dialect(&self) -> BackendDialect {
        BackendDialect::OpenAiCompatible
    }

    async fn generate(
        &self,
        ctx: &GenerationContext,
        req: GenerationRequest,
    ) -> Result<Option<String>, AnalysisError> {
        let url = format!("{}/chat/completions", ctx.endpoint.trim_end_matches('/'));
        let body = json!({
            "model": req.model,
            "messages": [{ "role": "user", "content": req.prompt }],
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": RESPONSE_SCHEMA_NAME,
                    "strict": true,
                    "schema": req.response_schema
                }
            }
        });

        let mut builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", req.request_id.as_str())
            .json(&body);
        if let Some(token) = &ctx.credential.token {
            builder = builder.bearer_auth(token);
        }

        let payload =
            http_common::send_json(PROVIDER, http_common::with_timeout(builder, ctx.timeout))
                .await?;
        extract_text(&payload)
    }
}

fn extract_text(payload: &Value) -> Result<Option<String>, AnalysisError> {
    let choice = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            AnalysisError::service(ProtocolError {
                provider: PROVIDER,
                reason: "response missing choices".to_string(),
            })
        })?;

    Ok(choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_string))
}

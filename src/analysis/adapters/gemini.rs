use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Map, Value, json};

use crate::analysis::{
    adapters::http_common,
    error::{AnalysisError, ProtocolError},
    ports::GenerationBackend,
    types::{BackendDialect, GenerationContext, GenerationRequest},
};

const PROVIDER: &str = "gemini";

#[derive(Clone)]
pub struct GeminiAdapter {
    client: Client,
}

impl GeminiAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationBackend for GeminiAdapter {
    fn dialect(&self) -> BackendDialect {
        BackendDialect::Gemini
    }

    async fn generate(
        &self,
        ctx: &GenerationContext,
        req: GenerationRequest,
    ) -> Result<Option<String>, AnalysisError> {
        let url = format!(
            "{}/{}:generateContent",
            ctx.endpoint.trim_end_matches('/'),
            model_path(&req.model)
        );
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": req.prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": to_response_schema(&req.response_schema)
            }
        });

        let mut builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", req.request_id.as_str())
            .json(&body);
        if let Some(token) = &ctx.credential.token {
            builder = builder.header("x-goog-api-key", token);
        }

        let payload =
            http_common::send_json(PROVIDER, http_common::with_timeout(builder, ctx.timeout))
                .await?;
        extract_text(&payload)
    }
}

fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(payload: &Value) -> Result<Option<String>, AnalysisError> {
    if let Some(error) = payload.get("error") {
        return Err(AnalysisError::service(ProtocolError {
            provider: PROVIDER,
            reason: format!("error object in 2xx reply: {error}"),
        }));
    }

    let Some(candidates) = payload.get("candidates") else {
        return Ok(None);
    };
    let Some(candidates) = candidates.as_array() else {
        return Err(AnalysisError::service(ProtocolError {
            provider: PROVIDER,
            reason: "candidates is not an array".to_string(),
        }));
    };

    let text = candidates
        .first()
        .and_then(|candidate| candidate.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());
    Ok(text)
}

/// Rewrites a JSON Schema document into the OpenAPI subset Gemini accepts
/// as `responseSchema`: upper-case type names, no `additionalProperties`.
pub fn to_response_schema(schema: &Value) -> Value {
    let Value::Object(node) = schema else {
        return schema.clone();
    };

    let mut converted = Map::new();
    for (key, value) in node {
        match key.as_str() {
            "additionalProperties" | "$schema" => {}
            "type" => {
                let upper = value
                    .as_str()
                    .map(|name| Value::String(name.to_ascii_uppercase()))
                    .unwrap_or_else(|| value.clone());
                converted.insert(key.clone(), upper);
            }
            "properties" => {
                let properties = match value.as_object() {
                    Some(properties) => Value::Object(
                        properties
                            .iter()
                            .map(|(name, property)| (name.clone(), to_response_schema(property)))
                            .collect(),
                    ),
                    None => value.clone(),
                };
                converted.insert(key.clone(), properties);
            }
            "items" => {
                converted.insert(key.clone(), to_response_schema(value));
            }
            _ => {
                converted.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(converted)
}

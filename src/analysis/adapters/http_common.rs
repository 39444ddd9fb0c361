use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::analysis::error::{AnalysisError, HttpStatusError, ProtocolError};

const ERROR_BODY_MAX_CHARS: usize = 240;

pub fn build_client() -> anyhow::Result<Client> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .map_err(|err| anyhow::anyhow!("failed to build analysis http client: {err}"))
}

pub fn with_timeout(builder: RequestBuilder, timeout: Option<Duration>) -> RequestBuilder {
    match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

pub fn map_http_error(status: u16, body: &str) -> AnalysisError {
    AnalysisError::service(HttpStatusError {
        status,
        body: body.chars().take(ERROR_BODY_MAX_CHARS).collect(),
    })
}

/// Sends the request and returns the decoded JSON body of a 2xx reply.
pub async fn send_json(
    provider: &'static str,
    builder: RequestBuilder,
) -> Result<serde_json::Value, AnalysisError> {
    let response = builder.send().await.map_err(AnalysisError::service)?;
    let response = ensure_success(response).await?;
    let body = response.text().await.map_err(AnalysisError::service)?;
    serde_json::from_str(&body).map_err(|err| {
        AnalysisError::service(ProtocolError {
            provider,
            reason: err.to_string(),
        })
    })
}

async fn ensure_success(response: Response) -> Result<Response, AnalysisError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(map_http_error(status, &body))
}

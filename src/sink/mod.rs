use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

pub mod record;

pub use record::{FormConfig, SinkRecord, derive_form_title, format_submission_timestamp};

/// Endpoint that archives submissions. Opaque: only ever used as a POST URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkTarget(String);

impl SinkTarget {
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return None;
        }
        Some(Self(url.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub target: Option<String>,
}

impl SinkConfig {
    pub fn target(&self) -> Option<SinkTarget> {
        self.target.clone().and_then(SinkTarget::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Skipped,
    Delivered { status: u16 },
    Failed { reason: String },
}

/// Best-effort archival. Implementations report how the attempt went but
/// never fail: the outcome is for diagnostics only.
#[async_trait]
pub trait SinkNotifier: Send + Sync {
    async fn notify(&self, record: SinkRecord) -> SinkOutcome;
}

pub struct HttpSinkNotifier {
    client: Client,
    target: Option<SinkTarget>,
}

impl HttpSinkNotifier {
    pub fn new(target: Option<SinkTarget>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| anyhow::anyhow!("failed to build sink http client: {err}"))?;
        Ok(Self { client, target })
    }

    fn failed(target: &SinkTarget, reason: String) -> SinkOutcome {
        tracing::warn!(
            target: "sink",
            sink_target = %target.as_str(),
            reason = %reason,
            "sink_delivery_failed"
        );
        SinkOutcome::Failed { reason }
    }
}

#[async_trait]
impl SinkNotifier for HttpSinkNotifier {
    async fn notify(&self, record: SinkRecord) -> SinkOutcome {
        let Some(target) = &self.target else {
            tracing::debug!(target: "sink", "sink_skipped_no_target");
            return SinkOutcome::Skipped;
        };

        let body = match serde_json::to_string(&record) {
            Ok(body) => body,
            Err(err) => return Self::failed(target, format!("failed to encode record: {err}")),
        };

        // The receiving script's reply is opaque; only the status line is
        // looked at.
        let response = self
            .client
            .post(target.as_str())
            .header(header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                let status = response.status().as_u16();
                tracing::debug!(target: "sink", status, "sink_delivered");
                SinkOutcome::Delivered { status }
            }
            Ok(response) => Self::failed(
                target,
                format!("sink returned status {}", response.status().as_u16()),
            ),
            Err(err) => Self::failed(target, format!("sink request failed: {err}")),
        }
    }
}

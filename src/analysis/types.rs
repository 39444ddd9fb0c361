use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::credentials::{CredentialRef, ResolvedCredential};

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BackendDialect {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

fn default_dialect() -> BackendDialect {
    BackendDialect::Gemini
}

fn default_endpoint() -> String {
    DEFAULT_GEMINI_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_credential() -> CredentialRef {
    CredentialRef::Env {
        var: DEFAULT_CREDENTIAL_ENV.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_dialect")]
    pub dialect: BackendDialect,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_credential")]
    pub credential: CredentialRef,
    /// Transport-level deadline; unset leaves timing to the HTTP client.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            endpoint: default_endpoint(),
            model: default_model(),
            credential: default_credential(),
            request_timeout_ms: None,
        }
    }
}

impl AnalysisConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub endpoint: String,
    pub credential: ResolvedCredential,
    pub timeout: Option<Duration>,
}

/// A single structured-output completion request. There is no streaming and
/// no conversation state: every call carries the whole prompt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub request_id: String,
    pub model: String,
    pub prompt: String,
    pub response_schema: Value,
}

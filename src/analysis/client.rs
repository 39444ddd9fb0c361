use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    analysis::{
        adapters,
        credentials::CredentialProvider,
        error::AnalysisError,
        ports::{AnalysisPort, GenerationBackend},
        prompts::build_evaluation_prompt,
        types::{AnalysisConfig, GenerationContext, GenerationRequest},
    },
    evaluation::{Evaluation, EvaluationSchema, ReflectionInput},
};

/// Turns a reflection into a validated [`Evaluation`] with one call to the
/// configured generation backend. Holds no per-call state and never retries.
pub struct AnalysisClient {
    config: AnalysisConfig,
    credentials: Arc<dyn CredentialProvider>,
    backend: Arc<dyn GenerationBackend>,
    schema: EvaluationSchema,
}

impl AnalysisClient {
    pub fn new(
        config: AnalysisConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> anyhow::Result<Self> {
        let backend = adapters::build_backend(config.dialect)?;
        Ok(Self {
            config,
            credentials,
            backend,
            schema: EvaluationSchema::compile()?,
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub async fn analyze(&self, input: &ReflectionInput) -> Result<Evaluation, AnalysisError> {
        let request_id = Uuid::now_v7().to_string();
        let credential = self.credentials.resolve(&self.config.credential).await?;

        let request = GenerationRequest {
            request_id: request_id.clone(),
            model: self.config.model.clone(),
            prompt: build_evaluation_prompt(input),
            response_schema: self.schema.document().clone(),
        };
        let ctx = GenerationContext {
            endpoint: self.config.endpoint.clone(),
            credential,
            timeout: self.config.request_timeout(),
        };

        tracing::debug!(
            target: "analysis",
            request_id = %request_id,
            dialect = ?self.backend.dialect(),
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "analysis_request_started"
        );

        let text = self
            .backend
            .generate(&ctx, request)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(AnalysisError::EmptyResponse)?;
        let evaluation = self.schema.parse(&text)?;

        tracing::debug!(
            target: "analysis",
            request_id = %request_id,
            score = evaluation.score,
            oreo_satisfied = evaluation.oreo_analysis.satisfied_parts(),
            "analysis_request_completed"
        );
        Ok(evaluation)
    }
}

#[async_trait]
impl AnalysisPort for AnalysisClient {
    async fn analyze(&self, input: &ReflectionInput) -> Result<Evaluation, AnalysisError> {
        AnalysisClient::analyze(self, input).await
    }
}

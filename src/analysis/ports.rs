use async_trait::async_trait;

use crate::{
    analysis::{
        error::AnalysisError,
        types::{BackendDialect, GenerationContext, GenerationRequest},
    },
    evaluation::{Evaluation, ReflectionInput},
};

/// What the submission pipeline needs from analysis: one validated
/// evaluation per call, or an error.
#[async_trait]
pub trait AnalysisPort: Send + Sync {
    async fn analyze(&self, input: &ReflectionInput) -> Result<Evaluation, AnalysisError>;
}

/// Wire adapter for one provider dialect. Returns the raw text payload of the
/// completion, `None` when the provider produced no text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn dialect(&self) -> BackendDialect;

    async fn generate(
        &self,
        ctx: &GenerationContext,
        req: GenerationRequest,
    ) -> Result<Option<String>, AnalysisError>;
}

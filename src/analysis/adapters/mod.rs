use std::sync::Arc;

use crate::analysis::{ports::GenerationBackend, types::BackendDialect};

pub mod gemini;
pub mod http_common;
pub mod openai_compatible;

pub fn build_backend(dialect: BackendDialect) -> anyhow::Result<Arc<dyn GenerationBackend>> {
    let client = http_common::build_client()?;
    let backend: Arc<dyn GenerationBackend> = match dialect {
        BackendDialect::Gemini => Arc::new(gemini::GeminiAdapter::new(client)),
        BackendDialect::OpenAiCompatible => {
            Arc::new(openai_compatible::OpenAiCompatibleAdapter::new(client))
        }
    };
    Ok(backend)
}

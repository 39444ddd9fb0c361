pub mod adapters;
pub mod client;
pub mod credentials;
pub mod error;
pub mod ports;
pub mod prompts;
pub mod types;

pub use client::AnalysisClient;
pub use credentials::{CredentialProvider, CredentialRef, EnvCredentialProvider, ResolvedCredential};
pub use error::{AnalysisError, HttpStatusError};
pub use ports::{AnalysisPort, GenerationBackend};
pub use prompts::build_evaluation_prompt;
pub use types::{AnalysisConfig, BackendDialect, GenerationContext, GenerationRequest};

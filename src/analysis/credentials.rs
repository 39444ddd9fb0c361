use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::error::AnalysisError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

#[derive(Clone, Default)]
pub struct ResolvedCredential {
    pub token: Option<String>,
}

impl ResolvedCredential {
    pub fn none() -> Self {
        Self { token: None }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, AnalysisError>;
}

#[derive(Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, AnalysisError> {
        match reference {
            CredentialRef::Env { var } => match env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(ResolvedCredential::token(token)),
                Ok(_) => Err(AnalysisError::AuthenticationMissing(format!(
                    "credential environment variable {var} is empty"
                ))),
                Err(_) => Err(AnalysisError::AuthenticationMissing(format!(
                    "missing credential environment variable {var}"
                ))),
            },
            CredentialRef::InlineToken { token } => {
                if token.trim().is_empty() {
                    return Err(AnalysisError::AuthenticationMissing(
                        "inline credential token cannot be empty".to_string(),
                    ));
                }
                Ok(ResolvedCredential::token(token.clone()))
            }
            CredentialRef::None => Ok(ResolvedCredential::none()),
        }
    }
}

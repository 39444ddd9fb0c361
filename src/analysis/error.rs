use crate::evaluation::SchemaViolation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis credential unavailable: {0}")]
    AuthenticationMissing(String),
    #[error("analysis service call failed: {0}")]
    ServiceError(#[source] BoxError),
    #[error("analysis service returned no text payload")]
    EmptyResponse,
    #[error("analysis result rejected: {0}")]
    MalformedResult(#[from] SchemaViolation),
}

impl AnalysisError {
    pub fn service(cause: impl Into<BoxError>) -> Self {
        Self::ServiceError(cause.into())
    }

    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationMissing(_) => "authentication_missing",
            Self::ServiceError(_) => "service_error",
            Self::EmptyResponse => "empty_response",
            Self::MalformedResult(_) => "malformed_result",
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::ServiceError(cause) => cause
                .downcast_ref::<HttpStatusError>()
                .map(|status_error| status_error.status),
            _ => None,
        }
    }
}

/// Non-2xx reply from the analysis service.
#[derive(Debug, thiserror::Error)]
#[error("service returned status {status}: {body}")]
pub struct HttpStatusError {
    pub status: u16,
    pub body: String,
}

/// Reply that arrived with 2xx but could not be read as the provider's
/// envelope format.
#[derive(Debug, thiserror::Error)]
#[error("{provider} response envelope is unreadable: {reason}")]
pub struct ProtocolError {
    pub provider: &'static str,
    pub reason: String,
}

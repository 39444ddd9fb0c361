use validator::ValidationErrors;

use crate::submission::state::SubmissionState;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("required fields are missing: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("submission not accepted while {0}")]
    Busy(SubmissionState),
    #[error("form is not editable while {0}")]
    NotEditable(SubmissionState),
    /// The cause is logged, not surfaced.
    #[error("analysis failed; the form will be editable again shortly")]
    AnalysisFailed,
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Busy(_) => "busy",
            Self::NotEditable(_) => "not_editable",
            Self::AnalysisFailed => "analysis_failed",
        }
    }
}

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One student's reflection as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionInput {
    #[validate(custom(function = "not_blank", message = "student info is required"))]
    pub student_info: String,
    #[serde(default)]
    pub impressive_phrase: String,
    #[validate(custom(function = "not_blank", message = "content is required"))]
    pub content: String,
}

impl ReflectionInput {
    pub fn new(
        student_info: impl Into<String>,
        impressive_phrase: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            student_info: student_info.into(),
            impressive_phrase: impressive_phrase.into(),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.student_info.is_empty() && self.impressive_phrase.is_empty() && self.content.is_empty()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OreoAnalysis {
    pub opinion: bool,
    pub reason: bool,
    pub example: bool,
    pub opinion_restated: bool,
}

impl OreoAnalysis {
    pub fn satisfied_parts(&self) -> usize {
        [self.opinion, self.reason, self.example, self.opinion_restated]
            .into_iter()
            .filter(|satisfied| *satisfied)
            .count()
    }
}

/// Structured assessment returned by the analysis service.
///
/// `score` is requested on a 0..=100 scale but is carried through as-is;
/// callers that render it should not assume the bound holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub summary: String,
    pub oreo_analysis: OreoAnalysis,
    pub score: i64,
    pub constructive_feedback: String,
    pub encouragement: String,
}

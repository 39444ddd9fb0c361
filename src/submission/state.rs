use std::fmt;

use serde::Serialize;

use crate::evaluation::{Evaluation, ReflectionInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Submitting,
    Reviewing,
    Failed,
}

impl SubmissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Reviewing => "reviewing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionField {
    StudentInfo,
    ImpressivePhrase,
    Content,
}

/// Everything a presentation layer needs to render the form: the current
/// state, the input it belongs to, and the evaluation once one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    cycle_id: u64,
    state: SubmissionState,
    input: ReflectionInput,
    evaluation: Option<Evaluation>,
}

impl Default for SubmissionSnapshot {
    fn default() -> Self {
        Self {
            cycle_id: 0,
            state: SubmissionState::Editing,
            input: ReflectionInput::default(),
            evaluation: None,
        }
    }
}

impl SubmissionSnapshot {
    pub fn cycle_id(&self) -> u64 {
        self.cycle_id
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn input(&self) -> &ReflectionInput {
        &self.input
    }

    /// Present only in `Reviewing`.
    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub(crate) fn replace_input(&mut self, input: ReflectionInput) {
        self.input = input;
    }

    pub(crate) fn set_field(&mut self, field: ReflectionField, value: String) {
        match field {
            ReflectionField::StudentInfo => self.input.student_info = value,
            ReflectionField::ImpressivePhrase => self.input.impressive_phrase = value,
            ReflectionField::Content => self.input.content = value,
        }
    }

    /// `Editing -> Submitting`. Returns the id of the new cycle.
    pub(crate) fn begin_cycle(&mut self) -> u64 {
        self.cycle_id = self.cycle_id.saturating_add(1);
        self.state = SubmissionState::Submitting;
        self.evaluation = None;
        self.cycle_id
    }

    pub(crate) fn finish_reviewing(&mut self, cycle_id: u64, evaluation: Evaluation) -> bool {
        if !self.is_active(cycle_id, SubmissionState::Submitting) {
            return false;
        }
        self.state = SubmissionState::Reviewing;
        self.evaluation = Some(evaluation);
        true
    }

    pub(crate) fn fail(&mut self, cycle_id: u64) -> bool {
        if !self.is_active(cycle_id, SubmissionState::Submitting) {
            return false;
        }
        self.state = SubmissionState::Failed;
        true
    }

    /// `Failed -> Editing`, keeping the input of the failed attempt. A timer
    /// from an older cycle finds a different id and leaves the state alone.
    pub(crate) fn recover(&mut self, cycle_id: u64) -> bool {
        if !self.is_active(cycle_id, SubmissionState::Failed) {
            return false;
        }
        self.state = SubmissionState::Editing;
        true
    }

    pub(crate) fn reset(&mut self) {
        self.state = SubmissionState::Editing;
        self.input = ReflectionInput::default();
        self.evaluation = None;
    }

    fn is_active(&self, cycle_id: u64, state: SubmissionState) -> bool {
        self.cycle_id == cycle_id && self.state == state
    }
}

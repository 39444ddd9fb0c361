pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::SubmitError;
pub use orchestrator::{SubmissionConfig, SubmissionOrchestrator};
pub use state::{ReflectionField, SubmissionSnapshot, SubmissionState};

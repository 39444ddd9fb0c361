use std::sync::Arc;

use napilsa::{
    analysis::{AnalysisError, AnalysisPort},
    sink::SinkNotifier,
    submission::{SubmissionConfig, SubmissionOrchestrator, SubmissionState},
    testing::HookAnalysis,
};

mod lifecycle;
mod recovery;
mod sink_isolation;

fn orchestrator(
    analysis: Arc<dyn AnalysisPort>,
    sink: Arc<dyn SinkNotifier>,
) -> SubmissionOrchestrator {
    SubmissionOrchestrator::new(analysis, sink, SubmissionConfig::default())
}

fn failing_analysis() -> Arc<HookAnalysis> {
    Arc::new(HookAnalysis::failing(|| AnalysisError::EmptyResponse))
}

async fn wait_for_state(orchestrator: &SubmissionOrchestrator, state: SubmissionState) {
    let mut rx = orchestrator.subscribe();
    rx.wait_for(|snapshot| snapshot.state() == state)
        .await
        .expect("orchestrator should still be alive");
}

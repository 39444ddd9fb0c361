use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use validator::Validate;

use crate::{
    analysis::AnalysisPort,
    evaluation::{Evaluation, ReflectionInput},
    sink::{FormConfig, SinkNotifier, SinkOutcome, SinkRecord},
    submission::{
        error::SubmitError,
        state::{ReflectionField, SubmissionSnapshot, SubmissionState},
    },
};

fn default_recovery_delay_ms() -> u64 {
    3_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// How long `Failed` is shown before the form becomes editable again.
    #[serde(default = "default_recovery_delay_ms")]
    pub recovery_delay_ms: u64,
    #[serde(default)]
    pub form: FormConfig,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            recovery_delay_ms: default_recovery_delay_ms(),
            form: FormConfig::default(),
        }
    }
}

impl SubmissionConfig {
    pub fn recovery_delay(&self) -> Duration {
        Duration::from_millis(self.recovery_delay_ms)
    }
}

struct Shared {
    analysis: Arc<dyn AnalysisPort>,
    sink: Arc<dyn SinkNotifier>,
    config: SubmissionConfig,
    state: watch::Sender<SubmissionSnapshot>,
}

/// Drives one reflection form through `Editing -> Submitting -> Reviewing`
/// (or `Failed`, then back to `Editing`). At most one cycle is in flight.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    shared: Arc<Shared>,
}

impl SubmissionOrchestrator {
    pub fn new(
        analysis: Arc<dyn AnalysisPort>,
        sink: Arc<dyn SinkNotifier>,
        config: SubmissionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                analysis,
                sink,
                config,
                state,
            }),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.shared.state.borrow().state()
    }

    pub fn snapshot(&self) -> SubmissionSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn edit(&self, input: ReflectionInput) -> Result<(), SubmitError> {
        self.mutate_editing(|snapshot| snapshot.replace_input(input))
    }

    pub fn edit_field(
        &self,
        field: ReflectionField,
        value: impl Into<String>,
    ) -> Result<(), SubmitError> {
        let value = value.into();
        self.mutate_editing(|snapshot| snapshot.set_field(field, value))
    }

    /// Back to an empty form. Not allowed while a cycle is still running or
    /// waiting to recover.
    pub fn reset(&self) -> Result<(), SubmitError> {
        let mut rejected = None;
        self.shared.state.send_if_modified(|snapshot| match snapshot.state() {
            SubmissionState::Editing | SubmissionState::Reviewing => {
                snapshot.reset();
                true
            }
            state => {
                rejected = Some(state);
                false
            }
        });
        match rejected {
            Some(state) => Err(SubmitError::NotEditable(state)),
            None => {
                tracing::debug!(target: "submission", "submission_reset");
                Ok(())
            }
        }
    }

    pub async fn submit(&self) -> Result<Evaluation, SubmitError> {
        let mut started: Option<Result<(u64, ReflectionInput), SubmitError>> = None;
        self.shared.state.send_if_modified(|snapshot| {
            if snapshot.state() != SubmissionState::Editing {
                started = Some(Err(SubmitError::Busy(snapshot.state())));
                return false;
            }
            if let Err(errors) = snapshot.input().validate() {
                started = Some(Err(SubmitError::Validation(errors)));
                return false;
            }
            let cycle_id = snapshot.begin_cycle();
            started = Some(Ok((cycle_id, snapshot.input().clone())));
            true
        });
        let (cycle_id, input) = match started {
            Some(started) => started?,
            None => return Err(SubmitError::Busy(self.state())),
        };

        tracing::info!(target: "submission", cycle_id, "submission_started");
        self.shared.dispatch_sink(cycle_id, &input);

        // The cycle runs detached so that dropping this future mid-flight
        // still ends in Reviewing or Failed.
        let shared = Arc::clone(&self.shared);
        let run = tokio::spawn(async move { shared.run_analysis(cycle_id, input).await });
        match run.await {
            Ok(result) => result,
            Err(join_error) => {
                tracing::error!(
                    target: "submission",
                    cycle_id,
                    error = %join_error,
                    "submission_task_aborted"
                );
                self.shared.fail_cycle(cycle_id);
                Err(SubmitError::AnalysisFailed)
            }
        }
    }

    fn mutate_editing(
        &self,
        apply: impl FnOnce(&mut SubmissionSnapshot),
    ) -> Result<(), SubmitError> {
        let mut rejected = None;
        self.shared.state.send_if_modified(|snapshot| {
            if snapshot.state() != SubmissionState::Editing {
                rejected = Some(snapshot.state());
                return false;
            }
            apply(snapshot);
            true
        });
        match rejected {
            Some(state) => Err(SubmitError::NotEditable(state)),
            None => Ok(()),
        }
    }
}

impl Shared {
    fn dispatch_sink(&self, cycle_id: u64, input: &ReflectionInput) {
        let record = SinkRecord::stamp(&self.config.form, input, OffsetDateTime::now_utc());
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.notify(record).await {
                SinkOutcome::Failed { reason } => tracing::warn!(
                    target: "submission",
                    cycle_id,
                    reason = %reason,
                    "sink_notification_failed"
                ),
                outcome => tracing::debug!(
                    target: "submission",
                    cycle_id,
                    outcome = ?outcome,
                    "sink_notification_finished"
                ),
            }
        });
    }

    async fn run_analysis(
        self: Arc<Self>,
        cycle_id: u64,
        input: ReflectionInput,
    ) -> Result<Evaluation, SubmitError> {
        match self.analysis.analyze(&input).await {
            Ok(evaluation) => {
                let landed = evaluation.clone();
                self.state
                    .send_if_modified(|snapshot| snapshot.finish_reviewing(cycle_id, landed));
                tracing::info!(
                    target: "submission",
                    cycle_id,
                    score = evaluation.score,
                    "submission_reviewing"
                );
                Ok(evaluation)
            }
            Err(err) => {
                tracing::warn!(
                    target: "submission",
                    cycle_id,
                    error_kind = err.kind(),
                    http_status = ?err.http_status(),
                    error = %err,
                    "submission_failed"
                );
                self.fail_cycle(cycle_id);
                Err(SubmitError::AnalysisFailed)
            }
        }
    }

    fn fail_cycle(self: &Arc<Self>, cycle_id: u64) {
        if !self.state.send_if_modified(|snapshot| snapshot.fail(cycle_id)) {
            return;
        }
        let shared = Arc::clone(self);
        let delay = self.config.recovery_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared
                .state
                .send_if_modified(|snapshot| snapshot.recover(cycle_id))
            {
                tracing::info!(target: "submission", cycle_id, "submission_recovered");
            }
        });
    }
}

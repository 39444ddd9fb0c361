use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};

use napilsa::{
    analysis::{AnalysisClient, EnvCredentialProvider},
    cli::CliArgs,
    config::Config,
    logging::init_tracing,
    sink::HttpSinkNotifier,
    submission::{SubmissionOrchestrator, SubmitError},
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::from_env()?;
    let config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let _logging_guard = init_tracing(&config.logging).context("failed to initialize logging")?;

    let analysis = AnalysisClient::new(config.analysis.clone(), Arc::new(EnvCredentialProvider))
        .context("failed to construct analysis client")?;
    let sink = HttpSinkNotifier::new(config.sink.target())
        .context("failed to construct sink notifier")?;
    let orchestrator = SubmissionOrchestrator::new(
        Arc::new(analysis),
        Arc::new(sink),
        config.submission.clone(),
    );

    orchestrator.edit(args.reflection_input()?)?;

    match orchestrator.submit().await {
        Ok(evaluation) => {
            let rendered = serde_json::to_string_pretty(&evaluation)
                .context("failed to render evaluation")?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmitError::Validation(errors)) => {
            eprintln!("학번/이름과 내용을 모두 입력해 주세요.");
            tracing::debug!(target: "submission", errors = %errors, "submission_rejected");
            Ok(ExitCode::from(2))
        }
        Err(err) => {
            eprintln!("분석 중 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.");
            tracing::debug!(target: "submission", error_kind = err.kind(), "submission_not_completed");
            Ok(ExitCode::FAILURE)
        }
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{analysis::AnalysisConfig, sink::SinkConfig, submission::SubmissionConfig};

pub const DEFAULT_CONFIG_PATH: &str = "napilsa.jsonc";
const SCHEMA_FILE_NAME: &str = "napilsa.schema.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = locate_config_schema(config_base, &config_value)?;
        check_config_shape(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;

        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }

        Ok(config)
    }
}

/// `$schema` wins (relative to the config file); otherwise the schema must sit
/// beside the config as `napilsa.schema.json`.
fn locate_config_schema(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    match config_value.get("$schema").and_then(Value::as_str) {
        Some(declared) => Ok(config_base.join(declared)),
        None => {
            let beside = config_base.join(SCHEMA_FILE_NAME);
            if beside.is_file() {
                Ok(beside)
            } else {
                Err(anyhow!(
                    "no napilsa config schema: add \"$schema\" or place {SCHEMA_FILE_NAME} in {}",
                    config_base.display()
                ))
            }
        }
    }
}

fn check_config_shape(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema: Value = fs::read_to_string(schema_path)
        .with_context(|| format!("cannot read config schema {}", schema_path.display()))
        .and_then(|text| {
            serde_json::from_str(&text)
                .with_context(|| format!("config schema {} is not JSON", schema_path.display()))
        })?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| anyhow!("config schema {} does not compile: {e}", schema_path.display()))?;

    compiled.validate(config_value).map_err(|errors| {
        let problems = errors
            .map(|error| match error.instance_path.to_string() {
                path if path.is_empty() => error.to_string(),
                path => format!("{path}: {error}"),
            })
            .collect::<Vec<_>>();
        anyhow!("napilsa config rejected: {}", problems.join("; "))
    })
}

use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::{config::DEFAULT_CONFIG_PATH, evaluation::ReflectionInput};

const USAGE: &str = "usage: napilsa [--config <path>] --student-info <text> [--phrase <text>] \
                     (--content <text> | --content-file <path>)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Inline(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub student_info: String,
    pub impressive_phrase: String,
    pub content: ContentSource,
}

impl CliArgs {
    pub fn from_env() -> Result<Self> {
        parse_args(env::args().skip(1))
    }

    /// Reads `--content-file` if given. Blank fields are passed through; the
    /// submission step owns validation.
    pub fn reflection_input(&self) -> Result<ReflectionInput> {
        let content = match &self.content {
            ContentSource::Inline(text) => text.clone(),
            ContentSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read content file {}", path.display()))?,
        };
        Ok(ReflectionInput::new(
            self.student_info.clone(),
            self.impressive_phrase.clone(),
            content,
        ))
    }
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut student_info = None;
    let mut impressive_phrase = None;
    let mut content = None;

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next()
                .ok_or_else(|| anyhow!("missing value for {flag}. {USAGE}"))
        };
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(value_for("--config")?)),
            "--student-info" => student_info = Some(value_for("--student-info")?),
            "--phrase" => impressive_phrase = Some(value_for("--phrase")?),
            "--content" | "--content-file" if content.is_some() => {
                return Err(anyhow!(
                    "--content and --content-file are mutually exclusive. {USAGE}"
                ));
            }
            "--content" => content = Some(ContentSource::Inline(value_for("--content")?)),
            "--content-file" => {
                content = Some(ContentSource::File(PathBuf::from(value_for(
                    "--content-file",
                )?)))
            }
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        student_info: student_info.ok_or_else(|| anyhow!("missing --student-info. {USAGE}"))?,
        impressive_phrase: impressive_phrase.unwrap_or_default(),
        content: content.ok_or_else(|| anyhow!("missing --content or --content-file. {USAGE}"))?,
    })
}

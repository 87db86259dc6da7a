//! Run configuration.
//!
//! Each setting resolves in priority order:
//! 1. CLI flag
//! 2. JSON config file passed with `--config`
//! 3. `KWPERM_LM_COMMAND` environment variable (LM command only)
//! 4. Built-in default
use crate::cli::{Backend, RunArgs};
use crate::encoding;
use crate::generator::{CommandGenerator, Generator, HttpGenerator, PromptMode};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LM_COMMAND_ENV: &str = "KWPERM_LM_COMMAND";
pub const DEFAULT_LM_COMMAND: &str = "ollama run llama3.2";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_INPUT: &str = "input.csv";
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Optional settings loaded from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default)]
    pub lm_command: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_stdin: Option<bool>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub backend: Backend,
    pub lm_command: String,
    pub endpoint: String,
    pub model: String,
    pub prompt_mode: PromptMode,
    pub timeout: Option<Duration>,
    pub encoding: Option<String>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
}

/// Merge CLI, config file, and environment into a validated [`RunConfig`].
pub fn resolve(args: &RunArgs, env_command: Option<String>) -> Result<RunConfig> {
    let file = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let lm_command = args
        .lm
        .clone()
        .or(file.lm_command)
        .or(env_command.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_LM_COMMAND.to_string());
    let prompt_stdin = args.prompt_stdin || file.prompt_stdin.unwrap_or(false);
    let timeout_secs = args.timeout_secs.or(file.timeout_secs);

    let config = RunConfig {
        input: args
            .input
            .clone()
            .or(file.input)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        output: args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        backend: args.backend.or(file.backend).unwrap_or_default(),
        lm_command,
        endpoint: args
            .endpoint
            .clone()
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        model: args
            .model
            .clone()
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        prompt_mode: if prompt_stdin {
            PromptMode::Stdin
        } else {
            PromptMode::Argument
        },
        timeout: timeout_secs.map(Duration::from_secs),
        encoding: args.encoding.clone().or(file.encoding),
    };
    validate(&config, timeout_secs)?;
    Ok(config)
}

fn validate(config: &RunConfig, timeout_secs: Option<u64>) -> Result<()> {
    if timeout_secs == Some(0) {
        return Err(anyhow!("timeout_secs must be greater than zero"));
    }
    if let Some(label) = config.encoding.as_deref() {
        if label != "auto" {
            encoding::lookup_label(label)?;
        }
    }
    match config.backend {
        Backend::Command => {
            let argv = shell_words::split(&config.lm_command)
                .with_context(|| format!("parse LM command: {}", config.lm_command))?;
            if argv.is_empty() {
                return Err(anyhow!("LM command is empty"));
            }
        }
        Backend::Http => {
            if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://")
            {
                return Err(anyhow!(
                    "endpoint must start with http:// or https:// (got {:?})",
                    config.endpoint
                ));
            }
            if config.model.trim().is_empty() {
                return Err(anyhow!("model must be non-empty"));
            }
        }
    }
    Ok(())
}

/// Build the generator backend described by `config`.
pub fn build_generator(config: &RunConfig) -> Result<Box<dyn Generator>> {
    match config.backend {
        Backend::Command => {
            let generator = CommandGenerator::from_command_line(
                &config.lm_command,
                config.prompt_mode,
                config.timeout,
            )?;
            generator.preflight();
            Ok(Box::new(generator))
        }
        Backend::Http => Ok(Box::new(HttpGenerator::new(
            &config.endpoint,
            &config.model,
            config.timeout,
        ))),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

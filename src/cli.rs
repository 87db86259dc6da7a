//! CLI argument parsing for the keyword enrichment run.
//!
//! Every flag is optional; unset values fall through to the config file,
//! environment, and built-in defaults (see [`crate::config`]).
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Which generator implementation serves the prompts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Run a local LM command line once per record
    #[default]
    Command,
    /// POST to an Ollama-compatible /api/generate endpoint
    Http,
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "kwperm",
    version,
    about = "Generate keyword variations for a CSV of keyword records",
    after_help = "Examples:\n  kwperm\n  kwperm --input keywords.csv --output enriched.csv\n  kwperm --lm 'llm -m gpt-4o-mini' --timeout-secs 60\n  kwperm --backend http --endpoint http://localhost:11434 --model llama3.2"
)]
pub struct RunArgs {
    /// Input CSV [default: input.csv]
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output CSV, overwritten if present [default: output.csv]
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// LM command line; the prompt is appended or replaces `{prompt}` [default: ollama run llama3.2]
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Generator backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Base URL for the http backend [default: http://localhost:11434]
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model name for the http backend [default: llama3.2]
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Send the prompt on stdin instead of as an argument
    #[arg(long)]
    pub prompt_stdin: bool,

    /// Per-call timeout; a timed out call is recorded as an error for that row
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Force the input encoding (e.g. utf-8, windows-1252); `auto` detects
    #[arg(long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// JSON config file with the same settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log one line per record instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Emit debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

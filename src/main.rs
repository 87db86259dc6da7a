use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

mod cli;
mod config;
mod encoding;
mod enricher;
mod error;
mod generator;
mod loader;
mod pipeline;
mod progress;
mod record;
mod writer;

use cli::RunArgs;
use pipeline::{run_pipeline, RunPaths, RunSummary};
use progress::{BarProgress, LogProgress, ProgressReporter};

fn main() -> ExitCode {
    let args = RunArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(summary) => {
            tracing::debug!(encoding = summary.encoding, "run finished");
            println!(
                "Processing complete. Results written to '{}'",
                summary.output.display()
            );
            if summary.enrich.failed > 0 {
                eprintln!(
                    "{} of {} records recorded an error; see the Permutations column",
                    summary.enrich.failed, summary.enrich.total
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<RunSummary> {
    let env_command = std::env::var(config::LM_COMMAND_ENV).ok();
    let config = config::resolve(&args, env_command)?;
    let resolver = encoding::resolver_for(config.encoding.as_deref())?;
    let generator = config::build_generator(&config)?;
    let progress: Box<dyn ProgressReporter> =
        if args.no_progress || !std::io::stderr().is_terminal() {
            Box::new(LogProgress)
        } else {
            Box::new(BarProgress::new())
        };

    tracing::info!(
        input = %config.input.display(),
        output = %config.output.display(),
        "starting CSV processing"
    );
    let summary = run_pipeline(
        RunPaths {
            input: &config.input,
            output: &config.output,
        },
        generator.as_ref(),
        resolver.as_ref(),
        progress.as_ref(),
    )?;
    Ok(summary)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose { "kwperm=debug" } else { "kwperm=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

//! Load → enrich → write, with fatal failures halting before any output.
use crate::encoding::EncodingResolver;
use crate::enricher::{EnrichSummary, Enricher};
use crate::error::PipelineError;
use crate::generator::Generator;
use crate::loader::load_input;
use crate::progress::ProgressReporter;
use crate::writer::write_records;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a run is (or stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Validating,
    DecodingDetected,
    SchemaChecked,
    Enriching,
    Writing,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStage::Validating => "validating",
            RunStage::DecodingDetected => "decoding",
            RunStage::SchemaChecked => "schema check",
            RunStage::Enriching => "enriching",
            RunStage::Writing => "writing",
            RunStage::Done => "done",
        };
        f.write_str(label)
    }
}

impl RunStage {
    /// Stage that a fatal error halts the run in.
    pub fn of(err: &PipelineError) -> Self {
        match err {
            PipelineError::FileNotFound { .. } | PipelineError::Read { .. } => {
                RunStage::Validating
            }
            PipelineError::UndecodableInput { .. } => RunStage::DecodingDetected,
            PipelineError::SchemaMismatch { .. } | PipelineError::MalformedInput { .. } => {
                RunStage::SchemaChecked
            }
            PipelineError::WriteFailure { .. } => RunStage::Writing,
        }
    }
}

pub struct RunPaths<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub encoding: &'static str,
    pub enrich: EnrichSummary,
}

pub fn run_pipeline(
    paths: RunPaths<'_>,
    generator: &dyn Generator,
    resolver: &dyn EncodingResolver,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary, PipelineError> {
    tracing::debug!(stage = %RunStage::Validating, input = %paths.input.display());
    let loaded = load_input(paths.input, resolver).inspect_err(|err| {
        tracing::debug!(stage = %RunStage::of(err), error = %err, "run halted");
    })?;
    tracing::info!(
        rows = loaded.records.len(),
        encoding = loaded.encoding,
        generator = %generator.describe(),
        "input loaded"
    );
    tracing::debug!(stage = %RunStage::SchemaChecked, headers = ?loaded.headers);

    tracing::debug!(stage = %RunStage::Enriching);
    let (records, enrich) = Enricher::new(generator, progress).run(loaded.records);

    tracing::debug!(stage = %RunStage::Writing, output = %paths.output.display());
    write_records(paths.output, &records)?;

    tracing::debug!(stage = %RunStage::Done);
    Ok(RunSummary {
        output: paths.output.to_path_buf(),
        encoding: loaded.encoding,
        enrich,
    })
}

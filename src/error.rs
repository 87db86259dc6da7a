//! Run-level error taxonomy.
//!
//! Every variant here is fatal to the run. Per-record generator failures live
//! in [`crate::generator::GeneratorError`] and are recovered in place.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input file '{}' not found", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("could not decode '{}' with any of: {}", .path.display(), .tried.join(", "))]
    UndecodableInput { path: PathBuf, tried: Vec<String> },

    #[error(
        "input is missing required columns: {} (found: {})",
        .missing.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("malformed CSV in '{}'", .path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write '{}': {detail}", .path.display())]
    WriteFailure { path: PathBuf, detail: String },

    #[error("failed to read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

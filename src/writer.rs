//! Output serialization: UTF-8 CSV with the fixed six-column layout.
//!
//! Columns outside the fixed set are dropped.
use crate::error::PipelineError;
use crate::record::{Record, COLUMNS};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write `records` to `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), PipelineError> {
    let failure = |detail: String| PipelineError::WriteFailure {
        path: path.to_path_buf(),
        detail,
    };
    let file = File::create(path).map_err(|err| failure(err.to_string()))?;
    write_to(file, records).map_err(|err| failure(err.to_string()))?;
    tracing::debug!(path = %path.display(), rows = records.len(), "output written");
    Ok(())
}

/// Serialize header and rows into any writer.
pub fn write_to<W: Write>(sink: W, records: &[Record]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(record.cells())?;
    }
    writer.flush()?;
    Ok(())
}

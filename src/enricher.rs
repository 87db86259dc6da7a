//! Per-record enrichment: prompt assembly, one generator call, normalization.
//!
//! Records are processed strictly in input order, one call at a time. A failed
//! call becomes an error marker in that record's `Permutations` cell and the
//! batch moves on.
use crate::generator::{Generator, GeneratorError};
use crate::progress::ProgressReporter;
use crate::record::Record;

/// Stored when the generator succeeded but produced no usable lines.
pub const NO_RESULTS: &str = "No permutations found";
/// Prefix that marks a per-record failure.
pub const ERROR_PREFIX: &str = "Error: ";
pub const JOIN_DELIMITER: &str = ", ";

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Blank primary field; no call made.
    Skipped,
    Enriched { variations: usize },
    NoResults,
    Failed { detail: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub total: usize,
    pub enriched: usize,
    pub no_results: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl EnrichSummary {
    fn tally(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Enriched { .. } => self.enriched += 1,
            RecordOutcome::NoResults => self.no_results += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

pub fn build_prompt(keyword: &str) -> String {
    format!(
        "List variations or synonyms for the keyword '{keyword}', separated by commas, without any additional text."
    )
}

/// Flatten raw generator output into one line.
///
/// Lines are trimmed, blank lines dropped, and the rest joined with `", "`.
pub fn normalize_output(text: &str) -> (String, usize) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return (NO_RESULTS.to_string(), 0);
    }
    (lines.join(JOIN_DELIMITER), lines.len())
}

pub fn error_marker(err: &GeneratorError) -> String {
    format!("{ERROR_PREFIX}{}", err.detail())
}

/// Enrich one record. Blank keywords pass through untouched.
pub fn enrich_record(mut record: Record, generator: &dyn Generator) -> (Record, RecordOutcome) {
    let Some(keyword) = record.keyword() else {
        return (record, RecordOutcome::Skipped);
    };
    let prompt = build_prompt(keyword);
    let outcome = match generator.generate(&prompt) {
        Ok(text) => {
            let (permutations, variations) = normalize_output(&text);
            record.permutations = permutations;
            if variations == 0 {
                RecordOutcome::NoResults
            } else {
                RecordOutcome::Enriched { variations }
            }
        }
        Err(err) => {
            tracing::warn!(keyword, error = %err, "generator call failed");
            record.permutations = error_marker(&err);
            RecordOutcome::Failed { detail: err.detail() }
        }
    };
    (record, outcome)
}

/// Sequential enrichment stage.
pub struct Enricher<'a> {
    generator: &'a dyn Generator,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Enricher<'a> {
    pub fn new(generator: &'a dyn Generator, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            generator,
            progress,
        }
    }

    pub fn run(&self, records: Vec<Record>) -> (Vec<Record>, EnrichSummary) {
        let mut summary = EnrichSummary {
            total: records.len(),
            ..EnrichSummary::default()
        };
        self.progress.start(records.len());
        let mut enriched = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let keyword = record.keyword().map(str::to_string);
            tracing::debug!(row = index + 1, keyword = keyword.as_deref(), "enriching");
            let (record, outcome) = enrich_record(record, self.generator);
            summary.tally(&outcome);
            self.progress.record_done(index, keyword.as_deref(), &outcome);
            enriched.push(record);
        }
        self.progress.finish(&summary);
        (enriched, summary)
    }
}

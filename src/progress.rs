//! Progress reporting for the enrichment stage.
//!
//! Reporting is injected so the pipeline never branches on how progress is
//! displayed.
use crate::enricher::{EnrichSummary, RecordOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub trait ProgressReporter {
    fn start(&self, total: usize);
    fn record_done(&self, index: usize, keyword: Option<&str>, outcome: &RecordOutcome);
    fn finish(&self, summary: &EnrichSummary);
}

/// No-op reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&self, _total: usize) {}
    fn record_done(&self, _index: usize, _keyword: Option<&str>, _outcome: &RecordOutcome) {}
    fn finish(&self, _summary: &EnrichSummary) {}
}

/// One log line per record, for non-interactive runs.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn start(&self, total: usize) {
        tracing::info!(total, "enriching records");
    }

    fn record_done(&self, index: usize, keyword: Option<&str>, outcome: &RecordOutcome) {
        let row = index + 1;
        match outcome {
            RecordOutcome::Skipped => tracing::info!(row, "skipped blank keyword"),
            RecordOutcome::Enriched { variations } => {
                tracing::info!(row, keyword, variations, "enriched")
            }
            RecordOutcome::NoResults => tracing::info!(row, keyword, "no permutations found"),
            RecordOutcome::Failed { detail } => {
                tracing::warn!(row, keyword, detail = detail.as_str(), "record failed")
            }
        }
    }

    fn finish(&self, summary: &EnrichSummary) {
        tracing::info!(
            total = summary.total,
            enriched = summary.enriched,
            no_results = summary.no_results,
            failed = summary.failed,
            skipped = summary.skipped,
            "enrichment finished"
        );
    }
}

/// Terminal progress bar on stderr.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn record_done(&self, _index: usize, keyword: Option<&str>, outcome: &RecordOutcome) {
        if let RecordOutcome::Failed { detail } = outcome {
            self.bar
                .println(format!("{}: {detail}", keyword.unwrap_or("<blank>")));
        }
        self.bar.set_message(keyword.unwrap_or_default().to_string());
        self.bar.inc(1);
    }

    fn finish(&self, summary: &EnrichSummary) {
        self.bar.finish_with_message(format!(
            "{} enriched, {} without results, {} failed, {} skipped",
            summary.enriched, summary.no_results, summary.failed, summary.skipped
        ));
    }
}

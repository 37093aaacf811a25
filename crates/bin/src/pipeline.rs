//! Extraction runs with progress reporting.

use indicatif::{ProgressBar, ProgressStyle};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use subsidia::{CompanyReport, PipelineError, RunContext, RunOptions, YearOrchestrator};
use subsidia_output::{ExportError, ExportFormat, write_report};

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub(crate) struct ExtractConfig {
    /// Ticker symbol
    pub symbol: String,
    /// Inclusive year range
    pub years: RangeInclusive<i32>,
    /// Output directory
    pub output: PathBuf,
    /// Output layout
    pub format: ExportFormat,
    /// Overall time budget
    pub deadline: Option<Duration>,
    /// Whether to draw a progress bar
    pub progress: bool,
}

/// Progress bar over the requested years.
pub(crate) fn year_progress(years: &RangeInclusive<i32>) -> ProgressBar {
    let len = years.clone().count() as u64;
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run the orchestrator, advancing `progress` as each year completes.
pub(crate) async fn extract_with_progress(
    ctx: &RunContext,
    config: &ExtractConfig,
    progress: Option<&ProgressBar>,
) -> Result<CompanyReport, PipelineError> {
    let mut options = RunOptions::default();
    if let Some(deadline) = config.deadline {
        options = options.deadline(deadline);
    }

    if let Some(pb) = progress {
        pb.set_message(format!("Resolving {}...", config.symbol));
    }

    let result = YearOrchestrator::new(ctx)
        .with_options(options)
        .run_with_observer(&config.symbol, config.years.clone(), |report| {
            if let Some(pb) = progress {
                pb.set_message(format!("{} {}", report.year, report.status));
                pb.inc(1);
            }
        })
        .await;

    if let Some(pb) = progress {
        match &result {
            Ok(report) => pb.finish_with_message(format!(
                "{} years, {} subsidiaries",
                report.year_reports.len(),
                report.total_records()
            )),
            Err(_) => pb.finish_with_message("Failed!"),
        }
    }
    result
}

/// Write the report and return the written paths.
pub(crate) fn save(
    report: &CompanyReport,
    output: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    write_report(report, output, format)
}

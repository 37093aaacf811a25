//! Year-by-year extraction.
//!
//! Each year moves through `Pending -> Indexing -> Fetching -> Parsing -> Done`. Any failure
//! short-circuits to `Done` with a status, so one bad year never aborts the run.

use crate::error::{PipelineError, Result};
use std::ops::RangeInclusive;
use std::time::Duration;
use subsidia_edgar::{
    EdgarError, FilerIdentity, FilingIndexClient, FilingLookup, FilingReference,
    IdentifierResolver, RawDocument, RunContext,
};
use subsidia_exhibit::ExhibitParser;
use subsidia_output::{CompanyReport, YearReport, assemble};
use tokio::time::Instant;

/// Note recorded for years skipped once the run deadline has passed.
pub const DEADLINE_EXCEEDED: &str = "deadline exceeded";

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Wall-clock budget for the run, checked before each year
    pub deadline: Option<Duration>,
}

impl RunOptions {
    /// Set the run deadline.
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug)]
enum YearStage {
    Pending,
    Indexing,
    Fetching(FilingReference),
    Parsing(FilingReference, RawDocument),
    Done(YearReport),
}

impl YearStage {
    const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Indexing => "indexing",
            Self::Fetching(_) => "fetching",
            Self::Parsing(..) => "parsing",
            Self::Done(_) => "done",
        }
    }
}

/// Drives resolution, discovery, download and parsing for a range of years.
#[derive(Debug)]
pub struct YearOrchestrator<'a> {
    ctx: &'a RunContext,
    parser: ExhibitParser,
    options: RunOptions,
}

impl<'a> YearOrchestrator<'a> {
    /// Create an orchestrator over a run context.
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            parser: ExhibitParser::new(),
            options: RunOptions::default(),
        }
    }

    /// Use the given run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom exhibit parser.
    pub fn with_parser(mut self, parser: ExhibitParser) -> Self {
        self.parser = parser;
        self
    }

    /// Extract subsidiaries for every year in `years`.
    ///
    /// # Errors
    /// Fails before any per-year work when the range is empty or the symbol cannot be resolved.
    pub async fn run(&self, symbol: &str, years: RangeInclusive<i32>) -> Result<CompanyReport> {
        self.run_with_observer(symbol, years, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `observer` with each year's report as it completes.
    pub async fn run_with_observer<F>(
        &self,
        symbol: &str,
        years: RangeInclusive<i32>,
        mut observer: F,
    ) -> Result<CompanyReport>
    where
        F: FnMut(&YearReport) + Send,
    {
        if years.is_empty() {
            return Err(PipelineError::InvalidYearRange {
                start: *years.start(),
                end: *years.end(),
            });
        }

        let identity = IdentifierResolver::new(self.ctx).resolve(symbol).await?;
        let started = Instant::now();
        let mut reports = Vec::new();

        for year in years.clone() {
            let report = if self.deadline_passed(started) {
                YearReport::fetch_failed(year, DEADLINE_EXCEEDED, None)
            } else {
                self.process_year(&identity, year).await
            };

            tracing::info!(
                symbol = %identity.symbol,
                year,
                status = %report.status,
                records = report.records.len(),
                "year complete"
            );
            observer(&report);
            reports.push(report);
        }

        let stats = self.ctx.stats();
        tracing::info!(
            symbol = %identity.symbol,
            requests = stats.requests,
            retries = stats.retries,
            "run complete"
        );
        Ok(assemble(identity, years, reports))
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.options
            .deadline
            .is_some_and(|deadline| started.elapsed() >= deadline)
    }

    async fn process_year(&self, identity: &FilerIdentity, year: i32) -> YearReport {
        let mut stage = YearStage::Pending;
        loop {
            tracing::debug!(year, stage = stage.name(), "year stage");
            stage = match stage {
                YearStage::Pending => YearStage::Indexing,
                YearStage::Indexing => match FilingIndexClient::new(self.ctx)
                    .find_filing_for_year(&identity.stable_id, year)
                    .await
                {
                    Ok(FilingLookup::Found(reference)) => YearStage::Fetching(reference),
                    Ok(FilingLookup::NotFound(reason)) => {
                        YearStage::Done(YearReport::no_filing(year, reason))
                    }
                    Err(e) => YearStage::Done(failure(year, &e, None)),
                },
                YearStage::Fetching(reference) => {
                    match self.ctx.fetcher().get(&reference.document_url).await {
                        Ok(document) => YearStage::Parsing(reference, document),
                        Err(e) => YearStage::Done(failure(year, &e, Some(reference))),
                    }
                }
                YearStage::Parsing(reference, document) => match self.parser.parse(&document) {
                    Ok(records) => YearStage::Done(YearReport::ok(year, records, reference)),
                    Err(e) => {
                        tracing::warn!(year, error = %e, "exhibit could not be parsed");
                        YearStage::Done(YearReport::parse_failed(year, e.to_string(), reference))
                    }
                },
                YearStage::Done(report) => return report,
            };
        }
    }
}

/// Map a per-year fetch failure to a report: absent documents mean no filing.
fn failure(year: i32, error: &EdgarError, reference: Option<FilingReference>) -> YearReport {
    if error.is_absent() {
        tracing::info!(year, error = %error, "document absent");
        YearReport::no_filing(year, error.to_string())
    } else {
        tracing::warn!(year, error = %error, "fetch failed");
        YearReport::fetch_failed(year, error.to_string(), reference)
    }
}

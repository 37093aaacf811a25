//! Per-year and per-company subsidiary reports.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use subsidia_edgar::{FilerIdentity, FilingReference};
use subsidia_exhibit::SubsidiaryRecord;

/// Note attached to years the run never reached.
pub const NOT_PROCESSED: &str = "not processed";

/// Outcome of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YearStatus {
    /// Exhibit found and parsed (possibly to zero records)
    #[display("ok")]
    Ok,
    /// No annual filing, or no subsidiaries exhibit in it
    #[display("no_filing")]
    NoFiling,
    /// The filing or exhibit could not be retrieved
    #[display("fetch_failed")]
    FetchFailed,
    /// The exhibit was retrieved but could not be decoded
    #[display("parse_failed")]
    ParseFailed,
}

/// One year's outcome.
///
/// Only [`YearStatus::Ok`] reports carry records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReport {
    /// Calendar year
    pub year: i32,
    /// Subsidiaries in exhibit order
    pub records: Vec<SubsidiaryRecord>,
    /// Outcome
    pub status: YearStatus,
    /// Human-readable reason for a non-ok status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Filing the exhibit came from, when one was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing: Option<FilingReference>,
}

impl YearReport {
    /// A parsed exhibit.
    pub const fn ok(year: i32, records: Vec<SubsidiaryRecord>, filing: FilingReference) -> Self {
        Self {
            year,
            records,
            status: YearStatus::Ok,
            note: None,
            filing: Some(filing),
        }
    }

    /// No filing or no exhibit for the year.
    pub fn no_filing(year: i32, note: impl Into<String>) -> Self {
        Self::failed(year, YearStatus::NoFiling, note, None)
    }

    /// Retrieval failed.
    pub fn fetch_failed(year: i32, note: impl Into<String>, filing: Option<FilingReference>) -> Self {
        Self::failed(year, YearStatus::FetchFailed, note, filing)
    }

    /// Decoding the exhibit failed.
    pub fn parse_failed(year: i32, note: impl Into<String>, filing: FilingReference) -> Self {
        Self::failed(year, YearStatus::ParseFailed, note, Some(filing))
    }

    fn failed(
        year: i32,
        status: YearStatus,
        note: impl Into<String>,
        filing: Option<FilingReference>,
    ) -> Self {
        Self {
            year,
            records: Vec::new(),
            status,
            note: Some(note.into()),
            filing,
        }
    }

    /// Whether the year produced a parsed exhibit.
    pub fn is_ok(&self) -> bool {
        self.status == YearStatus::Ok
    }
}

/// All year reports for one filer.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    /// Filer the report describes
    pub identity: FilerIdentity,
    /// Year reports in ascending year order
    pub year_reports: BTreeMap<i32, YearReport>,
    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,
}

impl CompanyReport {
    /// Years covered, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.year_reports.keys().copied()
    }

    /// Report for a single year.
    pub fn year(&self, year: i32) -> Option<&YearReport> {
        self.year_reports.get(&year)
    }

    /// Total records across all years.
    pub fn total_records(&self) -> usize {
        self.year_reports.values().map(|r| r.records.len()).sum()
    }

    /// Condensed view without the records themselves.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            identity: self.identity.clone(),
            generated_at: self.generated_at,
            years: self
                .year_reports
                .values()
                .map(|r| YearSummary {
                    year: r.year,
                    status: r.status,
                    records: r.records.len(),
                    note: r.note.clone(),
                    filing: r.filing.clone(),
                })
                .collect(),
        }
    }

    /// Format the per-year outcome as an ASCII table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nSubsidiaries: {} ({}, CIK {})\n",
            self.identity.display_name, self.identity.symbol, self.identity.stable_id
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<6} {:<13} {:>8}  {:<22} {}\n",
            "Year", "Status", "Records", "Filing", "Note"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for report in self.year_reports.values() {
            let filing = report
                .filing
                .as_ref()
                .map(|f| f.filing_id.as_str())
                .unwrap_or("-");
            output.push_str(&format!(
                "{:<6} {:<13} {:>8}  {:<22} {}\n",
                report.year,
                report.status.to_string(),
                report.records.len(),
                filing,
                report.note.as_deref().unwrap_or("")
            ));
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!("Total records: {}\n", self.total_records()));
        output
    }
}

/// One line of a [`ReportSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    /// Calendar year
    pub year: i32,
    /// Outcome
    pub status: YearStatus,
    /// Number of records extracted
    pub records: usize,
    /// Reason for a non-ok status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Source filing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing: Option<FilingReference>,
}

/// Run summary written next to the per-year sheets.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Filer the report describes
    pub identity: FilerIdentity,
    /// Report generation timestamp
    pub generated_at: DateTime<Utc>,
    /// Per-year outcomes, ascending
    pub years: Vec<YearSummary>,
}

/// Assemble a company report whose keys are exactly `years`.
///
/// Reports for years outside the range are dropped; years without a report are filled as
/// [`YearStatus::FetchFailed`] with a "not processed" note. When a year is reported twice the
/// first report wins.
pub fn assemble(
    identity: FilerIdentity,
    years: RangeInclusive<i32>,
    reports: impl IntoIterator<Item = YearReport>,
) -> CompanyReport {
    let mut year_reports = BTreeMap::new();
    for report in reports {
        if years.contains(&report.year) {
            year_reports.entry(report.year).or_insert(report);
        }
    }
    for year in years {
        year_reports
            .entry(year)
            .or_insert_with(|| YearReport::fetch_failed(year, NOT_PROCESSED, None));
    }

    CompanyReport {
        identity,
        year_reports,
        generated_at: Utc::now(),
    }
}

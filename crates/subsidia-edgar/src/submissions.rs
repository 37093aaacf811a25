//! Filer submission indexes from the EDGAR submissions API.
//!
//! The API returns filing information as parallel arrays where each index corresponds to a
//! single filing. The `recent` block holds the latest filings (at least a year's worth, up to
//! 1000); older filings are split into overflow pages listed under `files`.

use crate::error::{EdgarError, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::HashSet;

/// Primary annual report forms.
pub const ANNUAL_FORMS: &[&str] = &["10-K", "10-K405", "10-KT", "10-KSB"];

/// Amendments of annual report forms.
pub const ANNUAL_AMENDMENT_FORMS: &[&str] = &["10-K/A", "10-K405/A", "10-KT/A", "10-KSB/A"];

/// Company submissions payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySubmissions {
    /// Central Index Key
    pub cik: String,
    /// Company name
    pub name: String,
    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: FilingColumns,
    /// Overflow pages holding older filings
    #[serde(default)]
    pub files: Vec<SubmissionPage>,
}

/// Columnar filing data, shared by the `recent` block and overflow pages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingColumns {
    /// Accession numbers (unique filing identifiers)
    pub accession_number: Vec<String>,
    /// Filing dates in YYYY-MM-DD format
    pub filing_date: Vec<String>,
    /// Period-of-report dates (fiscal period end), may be blank
    #[serde(default)]
    pub report_date: Vec<String>,
    /// Form types (e.g., "10-K", "10-K/A")
    pub form: Vec<String>,
    /// Primary document filenames
    #[serde(default)]
    pub primary_document: Vec<String>,
}

/// Reference to an overflow page of older filings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPage {
    /// File name, e.g. `CIK0000915389-submissions-001.json`
    pub name: String,
    /// Number of filings on the page
    #[serde(default)]
    pub filing_count: u32,
    /// Earliest filing date on the page
    pub filing_from: String,
    /// Latest filing date on the page
    pub filing_to: String,
}

impl SubmissionPage {
    /// Whether the page's date range overlaps the given calendar years.
    pub fn covers_years(&self, first: i32, last: i32) -> bool {
        let from = parse_date(&self.filing_from).map(|d| d.year());
        let to = parse_date(&self.filing_to).map(|d| d.year());
        match (from, to) {
            (Some(from), Some(to)) => from <= last && to >= first,
            // Unknown range: load it rather than miss filings
            _ => true,
        }
    }
}

/// Information about a specific filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingInfo {
    /// Accession number (unique filing identifier)
    pub accession_number: String,
    /// Form type (e.g., "10-K")
    pub form: String,
    /// Filing date
    pub filing_date: NaiveDate,
    /// Fiscal period end, when reported
    pub report_date: Option<NaiveDate>,
    /// Primary document filename
    pub primary_document: String,
}

impl FilingInfo {
    /// Whether this is a primary annual report.
    pub fn is_annual(&self) -> bool {
        ANNUAL_FORMS.contains(&self.form.as_str())
    }

    /// Whether this amends an annual report.
    pub fn is_annual_amendment(&self) -> bool {
        ANNUAL_AMENDMENT_FORMS.contains(&self.form.as_str())
    }
}

impl FilingColumns {
    /// Materialize rows into [`FilingInfo`]s, skipping rows with unparseable filing dates.
    pub fn filings(&self) -> Vec<FilingInfo> {
        (0..self.accession_number.len())
            .filter_map(|i| match self.filing_at_index(i) {
                Ok(filing) => Some(filing),
                Err(e) => {
                    tracing::debug!(index = i, error = %e, "skipping malformed filing row");
                    None
                }
            })
            .collect()
    }

    fn filing_at_index(&self, idx: usize) -> Result<FilingInfo> {
        let column = |values: &Vec<String>| values.get(idx).cloned().unwrap_or_default();

        let raw_date = column(&self.filing_date);
        let filing_date = parse_date(&raw_date)
            .ok_or_else(|| EdgarError::InvalidDate(format!("filing date {raw_date:?}")))?;

        Ok(FilingInfo {
            accession_number: column(&self.accession_number),
            form: column(&self.form),
            filing_date,
            report_date: parse_date(&column(&self.report_date)),
            primary_document: column(&self.primary_document),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Merged, run-cached view of a filer's submissions.
#[derive(Debug, Clone)]
pub struct SubmissionIndex {
    /// Central Index Key
    pub cik: String,
    /// Company name
    pub name: String,
    filings: Vec<FilingInfo>,
    pending_pages: Vec<SubmissionPage>,
    seen: HashSet<String>,
}

impl SubmissionIndex {
    /// Build an index from the submissions payload.
    pub fn new(submissions: CompanySubmissions) -> Self {
        let mut index = Self {
            cik: submissions.cik,
            name: submissions.name,
            filings: Vec::new(),
            pending_pages: submissions.filings.files,
            seen: HashSet::new(),
        };
        index.merge(&submissions.filings.recent);
        index
    }

    /// Merge an overflow page's filings, ignoring accession numbers already present.
    pub fn merge(&mut self, columns: &FilingColumns) {
        for filing in columns.filings() {
            if self.seen.insert(filing.accession_number.clone()) {
                self.filings.push(filing);
            }
        }
    }

    /// Overflow pages not yet merged whose ranges overlap the given years.
    pub fn pages_covering(&self, first: i32, last: i32) -> Vec<SubmissionPage> {
        self.pending_pages
            .iter()
            .filter(|page| page.covers_years(first, last))
            .cloned()
            .collect()
    }

    /// Mark an overflow page as merged.
    pub fn mark_loaded(&mut self, name: &str) {
        self.pending_pages.retain(|page| page.name != name);
    }

    /// All known filings.
    pub fn filings(&self) -> &[FilingInfo] {
        &self.filings
    }

    /// Candidate annual filings for a calendar year.
    pub fn annual_filings_for_year(&self, year: i32) -> YearCandidates {
        YearCandidates::select(&self.filings, year)
    }
}

/// Annual filings matching one year, split into the primary report and its amendments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearCandidates {
    /// Most recently filed primary annual report
    pub primary: Option<FilingInfo>,
    /// Amendments, most recently filed first
    pub amendments: Vec<FilingInfo>,
}

impl YearCandidates {
    /// Select candidates: filings filed in `year`, or failing that filings whose fiscal period
    /// ended in `year`.
    pub fn select(filings: &[FilingInfo], year: i32) -> Self {
        let annual: Vec<&FilingInfo> = filings
            .iter()
            .filter(|f| f.is_annual() || f.is_annual_amendment())
            .collect();

        let by_filing_date: Vec<&FilingInfo> = annual
            .iter()
            .copied()
            .filter(|f| f.filing_date.year() == year)
            .collect();
        let matched = if by_filing_date.is_empty() {
            annual
                .into_iter()
                .filter(|f| f.report_date.is_some_and(|d| d.year() == year))
                .collect()
        } else {
            by_filing_date
        };

        let newest_first = |a: &&FilingInfo, b: &&FilingInfo| {
            b.filing_date
                .cmp(&a.filing_date)
                .then_with(|| b.accession_number.cmp(&a.accession_number))
        };

        let mut primaries: Vec<&FilingInfo> =
            matched.iter().copied().filter(|f| f.is_annual()).collect();
        primaries.sort_by(newest_first);

        let mut amendments: Vec<&FilingInfo> = matched
            .iter()
            .copied()
            .filter(|f| f.is_annual_amendment())
            .collect();
        amendments.sort_by(newest_first);

        Self {
            primary: primaries.first().map(|f| (*f).clone()),
            amendments: amendments.into_iter().cloned().collect(),
        }
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.amendments.is_empty()
    }
}

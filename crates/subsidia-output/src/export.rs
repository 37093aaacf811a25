//! CSV and JSON export of company reports.
//!
//! The CSV layout is one sheet per year under `<out>/<SYMBOL>/`, plus a `summary.json` carrying
//! statuses and notes. The JSON layout is a single `<out>/<SYMBOL>.json` document.

use crate::report::{CompanyReport, YearReport};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Column headers of a year sheet.
pub const SHEET_COLUMNS: [&str; 3] = ["name", "jurisdiction", "ownership_percent"];

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One CSV sheet per year plus a JSON summary.
    #[default]
    Csv,

    /// A single pretty-printed JSON document.
    Json,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct SheetRow<'a> {
    name: &'a str,
    jurisdiction: Option<&'a str>,
    ownership_percent: Option<f64>,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for YearReport {
    /// CSV is the year's sheet: the header row is always present, so failed years export as an
    /// empty sheet.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(vec![]);
                wtr.write_record(SHEET_COLUMNS)?;
                for record in &self.records {
                    wtr.serialize(SheetRow {
                        name: record.name(),
                        jurisdiction: record.jurisdiction(),
                        ownership_percent: record.ownership_percent(),
                    })?;
                }
                into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for CompanyReport {
    /// CSV concatenates the year sheets, each preceded by a `# <year> <status>` comment line.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();
                for report in self.year_reports.values() {
                    output.push_str(&format!("# {} {}\n", report.year, report.status));
                    output.push_str(&report.export_to_string(ExportFormat::Csv)?);
                }
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Write a report under `out_dir` and return the paths written.
///
/// - [`ExportFormat::Csv`]: `<out_dir>/<SYMBOL>/<year>.csv` for every year plus
///   `<out_dir>/<SYMBOL>/summary.json`.
/// - [`ExportFormat::Json`]: `<out_dir>/<SYMBOL>.json`.
///
/// # Errors
/// Returns an error if a directory or file cannot be written.
pub fn write_report(
    report: &CompanyReport,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    let symbol = file_stem(&report.identity.symbol);

    match format {
        ExportFormat::Csv => {
            let dir = out_dir.join(&symbol);
            fs::create_dir_all(&dir)?;

            let mut written = Vec::with_capacity(report.year_reports.len() + 1);
            for (year, year_report) in &report.year_reports {
                let path = dir.join(format!("{year}.{}", format.extension()));
                year_report.export_to_file(&path, format)?;
                written.push(path);
            }

            let summary_path = dir.join("summary.json");
            let mut file = File::create(&summary_path)?;
            file.write_all(serde_json::to_string_pretty(&report.summary())?.as_bytes())?;
            written.push(summary_path);
            Ok(written)
        }
        ExportFormat::Json => {
            fs::create_dir_all(out_dir)?;
            let path = out_dir.join(format!("{symbol}.{}", format.extension()));
            report.export_to_file(&path, format)?;
            Ok(vec![path])
        }
    }
}

/// Ticker symbols such as `BRK/A` must not create nested paths.
fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') { c } else { '_' })
        .collect()
}

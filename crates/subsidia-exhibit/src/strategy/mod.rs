//! Table extraction strategies.
//!
//! Each strategy decides whether it understands a table's layout ([`TableStrategy::matches_header`])
//! and then turns rows into records ([`TableStrategy::extract_row`]). Strategies are tried in
//! priority order per table; the first one producing records wins.

pub mod headed;
pub mod headerless;

pub use headed::HeadedTable;
pub use headerless::HeaderlessTable;

use crate::jurisdiction::{is_jurisdiction, parse_ownership_cell};
use crate::record::{SubsidiaryRecord, collapse_whitespace};
use crate::text::{clean_name, is_boilerplate};

/// Names longer than this are running text caught in a layout table, not entities.
const MAX_NAME_LEN: usize = 200;

/// A table as a grid of normalized cell texts.
///
/// Construction drops empty rows and columns that are empty in every row (spacer columns), and
/// folds stand-alone `%` cells into the number before them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw cell texts.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let mut rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| fold_percent_cells(row.iter().map(|c| collapse_whitespace(c)).collect()))
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        let used: Vec<usize> = (0..width)
            .filter(|&col| rows.iter().any(|row| !row[col].is_empty()))
            .collect();
        let rows = rows
            .into_iter()
            .map(|row| used.iter().map(|&col| row[col].clone()).collect())
            .collect();

        Self { rows }
    }

    /// Rows in document order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns after normalization.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Whether the table has no content.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn fold_percent_cells(mut row: Vec<String>) -> Vec<String> {
    for idx in 1..row.len() {
        if !matches!(row[idx].as_str(), "%" | "%)") {
            continue;
        }
        if let Some(prev) = (0..idx).rev().find(|&i| !row[i].is_empty())
            && row[prev].trim_start_matches('(').parse::<f64>().is_ok()
        {
            let suffix = std::mem::take(&mut row[idx]);
            row[prev].push_str(&suffix);
        }
    }
    row
}

/// Column assignment a strategy derived for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Index of the first data row
    pub data_start: usize,
    /// Entity name column
    pub name: Option<usize>,
    /// Jurisdiction column
    pub jurisdiction: Option<usize>,
    /// Ownership percentage column
    pub ownership: Option<usize>,
}

impl TableLayout {
    fn is_attribute_column(&self, col: usize) -> bool {
        self.jurisdiction == Some(col) || self.ownership == Some(col)
    }
}

/// A way of reading subsidiaries out of a table.
pub trait TableStrategy: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Inspect the table and return its layout when this strategy applies.
    fn matches_header(&self, table: &Table) -> Option<TableLayout>;

    /// Read one data row.
    ///
    /// The default reads the layout's name column, falling back to the first non-empty cell
    /// outside the attribute columns.
    fn extract_row(&self, row: &[String], layout: &TableLayout) -> Option<SubsidiaryRecord> {
        let name = layout
            .name
            .and_then(|col| row.get(col))
            .filter(|cell| !cell.is_empty())
            .or_else(|| first_name_cell(row, layout))?;
        build_record(
            name,
            cell(row, layout.jurisdiction),
            cell(row, layout.ownership),
        )
    }
}

/// Strategies in priority order.
pub fn default_strategies() -> Vec<Box<dyn TableStrategy>> {
    vec![Box::new(HeadedTable), Box::new(HeaderlessTable)]
}

/// Run the strategy chain over one table.
pub(crate) fn extract_table(
    table: &Table,
    strategies: &[Box<dyn TableStrategy>],
) -> Vec<SubsidiaryRecord> {
    for strategy in strategies {
        let Some(layout) = strategy.matches_header(table) else {
            continue;
        };
        let records: Vec<_> = table
            .rows()
            .iter()
            .skip(layout.data_start)
            .filter_map(|row| strategy.extract_row(row, &layout))
            .collect();
        if !records.is_empty() {
            tracing::debug!(
                strategy = strategy.name(),
                records = records.len(),
                ?layout,
                "table extracted"
            );
            return records;
        }
    }
    Vec::new()
}

pub(crate) fn first_name_cell<'a>(row: &'a [String], layout: &TableLayout) -> Option<&'a String> {
    row.iter()
        .enumerate()
        .find(|(col, c)| !c.is_empty() && !layout.is_attribute_column(*col))
        .map(|(_, c)| c)
}

pub(crate) fn cell(row: &[String], col: Option<usize>) -> Option<&str> {
    col.and_then(|c| row.get(c))
        .map(String::as_str)
        .filter(|c| !c.is_empty())
}

/// Turn cell texts into a record, rejecting captions, headings and stray values.
pub(crate) fn build_record(
    name: &str,
    jurisdiction: Option<&str>,
    ownership: Option<&str>,
) -> Option<SubsidiaryRecord> {
    if is_boilerplate(name) {
        return None;
    }
    let name = clean_name(name);
    if name.len() > MAX_NAME_LEN
        || !name.chars().any(char::is_alphabetic)
        || (jurisdiction.is_none() && is_jurisdiction(&name))
    {
        return None;
    }
    SubsidiaryRecord::new(name).map(|record| {
        record
            .with_jurisdiction(jurisdiction)
            .with_ownership(ownership.and_then(parse_ownership_cell))
    })
}

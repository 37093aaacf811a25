//! Tables whose first rows name their columns.

use super::{Table, TableLayout, TableStrategy};
use crate::jurisdiction::{is_jurisdiction, parse_percent};
use regex::Regex;
use std::sync::LazyLock;

/// Rows searched for a header; titles often precede it.
const HEADER_SCAN: usize = 3;

const MAX_HEADER_CELL_LEN: usize = 80;

static NAME_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(the\s+)?(exact\s+)?(legal\s+)?(names?|subsidiar(y|ies)|entit(y|ies)|compan(y|ies))\b")
        .expect("valid regex")
});

/// A name header that stands on its own, without a companion column header.
static BARE_NAME_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(names?|subsidiar(y|ies)|entit(y|ies)|compan(y|ies))(\s+names?)?(\s+of\s+(the\s+)?(subsidiar(y|ies)|compan(y|ies)|entit(y|ies)))?$",
    )
    .expect("valid regex")
});

static JURISDICTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(jurisdiction|incorporat|organi[sz]ation|organized|formation|domicile|place\s+of|^(state|country)$|\b(state|country)\s+(or\s+\w+\s+)?(of|where)\b)",
    )
    .expect("valid regex")
});

static OWNERSHIP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(%|percent|ownership|owned|interest|held)").expect("valid regex"));

/// Reads tables with a header row such as `Name of Subsidiary | Jurisdiction of Incorporation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadedTable;

impl TableStrategy for HeadedTable {
    fn name(&self) -> &str {
        "headed"
    }

    fn matches_header(&self, table: &Table) -> Option<TableLayout> {
        table
            .rows()
            .iter()
            .take(HEADER_SCAN)
            .enumerate()
            .find_map(|(idx, row)| header_layout(row).map(|layout| TableLayout { data_start: idx + 1, ..layout }))
    }
}

fn is_header_cell(cell: &str) -> bool {
    !cell.is_empty() && cell.len() <= MAX_HEADER_CELL_LEN && parse_percent(cell).is_none()
}

fn header_layout(row: &[String]) -> Option<TableLayout> {
    if row.iter().any(|c| parse_percent(c).is_some()) {
        return None;
    }

    let jurisdiction = row
        .iter()
        .position(|c| is_header_cell(c) && JURISDICTION_HEADER.is_match(c) && !is_jurisdiction(c));
    let ownership = row.iter().enumerate().position(|(col, c)| {
        Some(col) != jurisdiction && is_header_cell(c) && OWNERSHIP_HEADER.is_match(c)
    });

    let name = row.iter().enumerate().position(|(col, c)| {
        Some(col) != jurisdiction
            && Some(col) != ownership
            && is_header_cell(c)
            && NAME_HEADER.is_match(c)
    })?;

    let has_companion = jurisdiction.is_some() || ownership.is_some();
    let non_empty = row.iter().filter(|c| !c.is_empty()).count();
    if !has_companion && !(non_empty == 1 && BARE_NAME_HEADER.is_match(&row[name])) {
        return None;
    }

    Some(TableLayout {
        data_start: 0,
        name: Some(name),
        jurisdiction,
        ownership,
    })
}

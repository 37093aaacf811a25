//! Tables without a header row; columns are inferred from their content.

use super::{Table, TableLayout, TableStrategy, build_record, cell, first_name_cell};
use crate::jurisdiction::{is_jurisdiction, parse_percent};
use crate::record::SubsidiaryRecord;
use crate::text::parse_line;

/// Reads tables by content: a column is a jurisdiction column when at least half its cells are
/// jurisdictions, and an ownership column when at least half are `NN%` values.
///
/// When no column wins the jurisdiction vote but exactly one text column remains beside the
/// name, that column is the jurisdiction: two-column exhibits list places the built-in tables
/// do not know (provinces, counties, emirates).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderlessTable;

#[derive(Debug, Default, Clone, Copy)]
struct ColumnProfile {
    filled: usize,
    jurisdictions: usize,
    percents: usize,
    numbers: usize,
}

impl ColumnProfile {
    const fn mostly(&self, count: usize) -> bool {
        count > 0 && count * 2 >= self.filled
    }
}

impl TableStrategy for HeaderlessTable {
    fn name(&self) -> &str {
        "headerless"
    }

    fn matches_header(&self, table: &Table) -> Option<TableLayout> {
        if table.is_empty() {
            return None;
        }

        let mut profiles = vec![ColumnProfile::default(); table.width()];
        for row in table.rows() {
            for (profile, cell) in profiles.iter_mut().zip(row) {
                if cell.is_empty() {
                    continue;
                }
                profile.filled += 1;
                if is_jurisdiction(cell) {
                    profile.jurisdictions += 1;
                }
                if parse_percent(cell).is_some() {
                    profile.percents += 1;
                }
                if cell.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-')) {
                    profile.numbers += 1;
                }
            }
        }

        let ownership = profiles.iter().position(|p| p.mostly(p.percents));
        let voted = profiles
            .iter()
            .enumerate()
            .position(|(col, p)| Some(col) != ownership && p.mostly(p.jurisdictions));
        let name = profiles.iter().enumerate().position(|(col, p)| {
            p.filled > 0 && Some(col) != ownership && Some(col) != voted
        })?;

        let jurisdiction = voted.or_else(|| {
            let mut remaining = profiles.iter().enumerate().filter(|(col, p)| {
                *col != name && Some(*col) != ownership && p.filled > 0 && !p.mostly(p.numbers)
            });
            match (remaining.next(), remaining.next()) {
                (Some((col, _)), None) => Some(col),
                _ => None,
            }
        });

        Some(TableLayout {
            data_start: 0,
            name: Some(name),
            jurisdiction,
            ownership,
        })
    }

    /// Name is the first non-empty cell outside the inferred attribute columns. Without a
    /// jurisdiction column the name cell is read like a text line, so single-column tables of
    /// `Acme, Inc., Delaware` still yield a jurisdiction.
    fn extract_row(&self, row: &[String], layout: &TableLayout) -> Option<SubsidiaryRecord> {
        let name = first_name_cell(row, layout)?;
        let ownership = cell(row, layout.ownership);

        if layout.jurisdiction.is_none() {
            let record = parse_line(name)?;
            let jurisdiction = record.jurisdiction().map(str::to_string);
            let percent = record.ownership_percent();
            return build_record(record.name(), jurisdiction.as_deref(), ownership).map(|r| {
                let percent = r.ownership_percent().or(percent);
                r.with_ownership(percent)
            });
        }

        build_record(name, cell(row, layout.jurisdiction), ownership)
    }
}

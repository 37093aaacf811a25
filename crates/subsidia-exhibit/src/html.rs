//! HTML exhibits: tables first, visible text as the fallback.

use crate::record::SubsidiaryRecord;
use crate::strategy::{Table, TableStrategy, extract_table};
use crate::text::parse_text;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").expect("valid selector"));

const MAX_COLSPAN: usize = 20;

const HIDDEN: &[&str] = &["script", "style", "head", "title", "noscript"];

const BLOCKS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6", "pre",
    "center", "blockquote", "hr", "section", "article", "body",
];

/// Parse an HTML exhibit.
///
/// Every innermost table runs through the strategy chain; records from all tables are kept in
/// document order (exhibits often split the list across page-sized tables). When no table yields
/// records the visible text is parsed line by line.
pub(crate) fn parse_html(html: &str, strategies: &[Box<dyn TableStrategy>]) -> Vec<SubsidiaryRecord> {
    let document = Html::parse_document(html);

    let records: Vec<_> = tables(&document)
        .iter()
        .flat_map(|table| extract_table(table, strategies))
        .collect();
    if !records.is_empty() {
        return records;
    }

    tracing::debug!("no table yielded records, parsing visible text");
    parse_text(&visible_text(document.root_element(), "\n"))
}

/// Innermost tables as normalized grids; layout tables wrapping other tables are skipped.
pub(crate) fn tables(document: &Html) -> Vec<Table> {
    document
        .select(&TABLE)
        .filter(|table| table.select(&TABLE).next().is_none())
        .map(|table| Table::new(table.select(&ROW).map(row_cells).collect()))
        .filter(|table| !table.is_empty())
        .collect()
}

fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in row.select(&CELL) {
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.push(visible_text(cell, " "));
        cells.extend(std::iter::repeat_n(String::new(), span - 1));
    }
    cells
}

/// Text of an element with block boundaries replaced by `line_break`.
///
/// Table cells are separated by tabs so the text parser sees them as columns.
pub(crate) fn visible_text(root: ElementRef<'_>, line_break: &str) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        match node.value() {
            Node::Element(el) if el.name() == "br" || BLOCKS.contains(&el.name()) => {
                out.push_str(line_break);
            }
            Node::Element(el) if matches!(el.name(), "td" | "th") => out.push('\t'),
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| HIDDEN.contains(&e.name()))
                });
                if hidden {
                    continue;
                }
                let after_block = node
                    .prev_sibling()
                    .and_then(|s| s.value().as_element())
                    .is_some_and(|e| BLOCKS.contains(&e.name()));
                if after_block {
                    out.push_str(line_break);
                }
                out.push_str(text);
            }
            _ => {}
        }
    }
    out
}

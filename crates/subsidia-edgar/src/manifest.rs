//! Filing manifests: the list of documents inside one filing, and exhibit discovery.
//!
//! EDGAR publishes each filing's documents on an index page (`{accession}-index.htm`) whose
//! document table has the columns Seq, Description, Document, Type and Size. When that page is
//! unavailable the folder's `index.json` directory listing is used instead; it carries file names
//! only.

use crate::error::{EdgarError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;

static EXHIBIT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*EX-?21(\.\d+)?(\s|$|[^0-9.])").expect("valid regex"));

static EXHIBIT_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ex(hibit)?[-_]?21(?:[-_.]?0?1)?(?:[^0-9]|$)").expect("valid regex")
});

/// Description phrasings used for the subsidiaries exhibit.
const TITLE_PHRASES: &[&str] = &[
    "subsidiaries of the registrant",
    "list of subsidiaries",
    "subsidiaries",
];

/// One document of a filing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Sequence number within the filing
    pub sequence: Option<u32>,
    /// Free-text description
    pub description: String,
    /// File name
    pub document: String,
    /// Document type designation (e.g. "EX-21.1"); empty when unknown
    pub doc_type: String,
    /// Absolute URL of the document
    pub url: String,
}

impl ManifestEntry {
    /// 0 for HTML, 1 for plain text, 2 for anything else (PDF, images).
    fn format_rank(&self) -> u8 {
        let name = self.document.to_ascii_lowercase();
        if name.ends_with(".htm") || name.ends_with(".html") {
            0
        } else if name.ends_with(".txt") {
            1
        } else {
            2
        }
    }
}

/// How strongly an entry was recognized as the subsidiaries exhibit. Lower is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// Type column carries an Exhibit 21 designation
    ExhibitType,
    /// Description names the subsidiaries list
    Title,
    /// File name follows the exhibit-21 naming convention
    FileName,
}

/// The entry chosen as the subsidiaries exhibit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhibitMatch {
    /// Matched document
    pub entry: ManifestEntry,
    /// Which rule matched
    pub rank: MatchRank,
}

/// Documents of one filing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilingManifest {
    /// Entries in manifest order
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct DirectoryListing {
    directory: Directory,
}

#[derive(Debug, Deserialize)]
struct Directory {
    #[serde(default)]
    item: Vec<DirectoryItem>,
}

#[derive(Debug, Deserialize)]
struct DirectoryItem {
    name: String,
}

impl FilingManifest {
    /// Parse a filing index page.
    ///
    /// `www_base` is the host links are relative to; `folder_url` is the filing's archive folder,
    /// used when a row has no link.
    pub fn from_index_html(html: &str, www_base: &str, folder_url: &str) -> Self {
        let doc = Html::parse_document(html);
        let (Ok(sel_table), Ok(sel_file_table), Ok(sel_tr), Ok(sel_cell), Ok(sel_a)) = (
            Selector::parse("table"),
            Selector::parse("table.tableFile"),
            Selector::parse("tr"),
            Selector::parse("th, td"),
            Selector::parse("a"),
        ) else {
            return Self::default();
        };

        let tables: Vec<ElementRef<'_>> = {
            let file_tables: Vec<_> = doc.select(&sel_file_table).collect();
            if file_tables.is_empty() {
                doc.select(&sel_table).collect()
            } else {
                file_tables
            }
        };

        let mut entries = Vec::new();
        for table in tables {
            let mut columns = ColumnLayout::default();
            for (row_idx, tr) in table.select(&sel_tr).enumerate() {
                let cells: Vec<ElementRef<'_>> = tr.select(&sel_cell).collect();
                let texts: Vec<String> = cells.iter().map(cell_text).collect();

                if row_idx == 0 && ColumnLayout::looks_like_header(&texts) {
                    columns = ColumnLayout::from_header(&texts);
                    continue;
                }
                let Some(document_cell) = cells.get(columns.document) else {
                    continue;
                };

                let href = document_cell
                    .select(&sel_a)
                    .next()
                    .and_then(|a| a.value().attr("href"));
                let document = texts[columns.document]
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if document.is_empty() {
                    continue;
                }

                let url = href.map_or_else(
                    || format!("{folder_url}/{document}"),
                    |href| absolute_url(href, www_base, folder_url),
                );

                entries.push(ManifestEntry {
                    sequence: texts.get(columns.sequence).and_then(|s| s.parse().ok()),
                    description: texts.get(columns.description).cloned().unwrap_or_default(),
                    document,
                    doc_type: texts.get(columns.doc_type).cloned().unwrap_or_default(),
                    url,
                });
            }
        }

        Self { entries }
    }

    /// Parse an `index.json` directory listing.
    pub fn from_directory_json(bytes: &[u8], folder_url: &str) -> Result<Self> {
        let listing: DirectoryListing = serde_json::from_slice(bytes)
            .map_err(|e| EdgarError::Decode(format!("invalid directory listing: {e}")))?;

        let entries = listing
            .directory
            .item
            .into_iter()
            .map(|item| ManifestEntry {
                sequence: None,
                description: String::new(),
                url: format!("{folder_url}/{}", item.name),
                document: item.name,
                doc_type: String::new(),
            })
            .collect();

        Ok(Self { entries })
    }

    /// Find the subsidiaries exhibit.
    ///
    /// Ties between candidates go to the strongest rule, then HTML over plain text over other
    /// formats, then manifest order. A document typed as Exhibit 21 is returned whatever its
    /// format, so an unreadable exhibit surfaces as a parse failure rather than a missing one;
    /// the weaker rules only consider HTML and text documents.
    pub fn find_subsidiaries_exhibit(&self) -> Option<ExhibitMatch> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| {
                let rank = classify(entry)?;
                let format = entry.format_rank();
                (rank == MatchRank::ExhibitType || format < 2).then_some((rank, format, pos))
            })
            .min()
            .map(|(rank, _, pos)| ExhibitMatch {
                entry: self.entries[pos].clone(),
                rank,
            })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest lists no documents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn classify(entry: &ManifestEntry) -> Option<MatchRank> {
    if EXHIBIT_TYPE.is_match(&entry.doc_type) {
        return Some(MatchRank::ExhibitType);
    }
    let description = entry.description.to_lowercase();
    if TITLE_PHRASES.iter().any(|phrase| description.contains(phrase)) {
        return Some(MatchRank::Title);
    }
    if EXHIBIT_FILE_NAME.is_match(&entry.document) {
        return Some(MatchRank::FileName);
    }
    None
}

/// Column positions of the index page's document table.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    sequence: usize,
    description: usize,
    document: usize,
    doc_type: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            sequence: 0,
            description: 1,
            document: 2,
            doc_type: 3,
        }
    }
}

impl ColumnLayout {
    fn looks_like_header(texts: &[String]) -> bool {
        texts
            .iter()
            .any(|t| t.eq_ignore_ascii_case("document") || t.eq_ignore_ascii_case("type"))
    }

    fn from_header(texts: &[String]) -> Self {
        let find = |name: &str, fallback: usize| {
            texts
                .iter()
                .position(|t| t.eq_ignore_ascii_case(name))
                .unwrap_or(fallback)
        };
        let default = Self::default();
        Self {
            sequence: find("seq", default.sequence),
            description: find("description", default.description),
            document: find("document", default.document),
            doc_type: find("type", default.doc_type),
        }
    }
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolute_url(href: &str, www_base: &str, folder_url: &str) -> String {
    // Inline XBRL viewer links wrap the archive path: /ix?doc=/Archives/...
    let href = href.strip_prefix("/ix?doc=").unwrap_or(href);
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{www_base}{href}")
    } else {
        format!("{folder_url}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const WWW: &str = "https://www.sec.gov";
    const FOLDER: &str = "https://www.sec.gov/Archives/edgar/data/915389/000091538924000009";

    const INDEX_PAGE: &str = r#"
        <html><body>
        <table class="tableFile" summary="Document Format Files">
          <tr><th scope="col">Seq</th><th scope="col">Description</th><th scope="col">Document</th><th scope="col">Type</th><th scope="col">Size</th></tr>
          <tr><td>1</td><td>10-K</td><td><a href="/ix?doc=/Archives/edgar/data/915389/000091538924000009/emn-20231231.htm">emn-20231231.htm</a> iXBRL</td><td>10-K</td><td>3000000</td></tr>
          <tr><td>5</td><td>EXHIBIT 10.21</td><td><a href="/Archives/edgar/data/915389/000091538924000009/emn-20231231xex1021.htm">emn-20231231xex1021.htm</a></td><td>EX-10.21</td><td>1000</td></tr>
          <tr><td>6</td><td>SUBSIDIARIES OF THE COMPANY</td><td><a href="/Archives/edgar/data/915389/000091538924000009/emn-20231231xex21.htm">emn-20231231xex21.htm</a></td><td>EX-21</td><td>9000</td></tr>
          <tr><td>&nbsp;</td><td>Complete submission text file</td><td><a href="/Archives/edgar/data/915389/000091538924000009/0000915389-24-000009.txt">0000915389-24-000009.txt</a></td><td>&nbsp;</td><td>9999</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_index_page() {
        let manifest = FilingManifest::from_index_html(INDEX_PAGE, WWW, FOLDER);
        assert_eq!(manifest.len(), 4);

        let primary = &manifest.entries[0];
        assert_eq!(primary.document, "emn-20231231.htm");
        assert_eq!(primary.sequence, Some(1));
        assert_eq!(primary.url, format!("{FOLDER}/emn-20231231.htm"));
    }

    #[test]
    fn test_find_exhibit_by_type() {
        let manifest = FilingManifest::from_index_html(INDEX_PAGE, WWW, FOLDER);
        let found = manifest.find_subsidiaries_exhibit().unwrap();
        assert_eq!(found.rank, MatchRank::ExhibitType);
        assert_eq!(found.entry.document, "emn-20231231xex21.htm");
        assert_eq!(found.entry.doc_type, "EX-21");
    }

    #[rstest]
    #[case("EX-21", true)]
    #[case("EX-21.1", true)]
    #[case("EX-21.01", true)]
    #[case("ex-21", true)]
    #[case("EX-21 SUBSIDIARIES", true)]
    #[case("EX-211", false)]
    #[case("EX-10.21", false)]
    #[case("EX-2.1", false)]
    #[case("10-K", false)]
    fn test_exhibit_type_designations(#[case] doc_type: &str, #[case] expected: bool) {
        assert_eq!(EXHIBIT_TYPE.is_match(doc_type), expected);
    }

    #[rstest]
    #[case("emn-20231231xex21.htm", true)]
    #[case("exhibit21-12312019.htm", true)]
    #[case("dex21.htm", true)]
    #[case("ex21-1.htm", true)]
    #[case("ex2101.htm", true)]
    #[case("EX-21.txt", true)]
    #[case("emn-20231231xex1021.htm", false)]
    #[case("ex-10.htm", false)]
    #[case("emn-20231231.htm", false)]
    fn test_exhibit_file_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(EXHIBIT_FILE_NAME.is_match(name), expected);
    }

    #[test]
    fn test_find_exhibit_by_title() {
        let manifest = FilingManifest {
            entries: vec![ManifestEntry {
                sequence: Some(9),
                description: "List of Subsidiaries".into(),
                document: "d12345.htm".into(),
                doc_type: "EX-99".into(),
                url: format!("{FOLDER}/d12345.htm"),
            }],
        };
        let found = manifest.find_subsidiaries_exhibit().unwrap();
        assert_eq!(found.rank, MatchRank::Title);
    }

    fn entry(name: &str, doc_type: &str) -> ManifestEntry {
        ManifestEntry {
            sequence: None,
            description: String::new(),
            document: name.to_string(),
            doc_type: doc_type.to_string(),
            url: format!("{FOLDER}/{name}"),
        }
    }

    #[rstest]
    #[case(&["ex21.txt", "ex21.htm"], "ex21.htm")]
    #[case(&["ex21.pdf", "ex21.txt"], "ex21.txt")]
    #[case(&["ex21.pdf", "ex21.htm", "ex21.txt"], "ex21.htm")]
    #[case(&["ex21.pdf"], "ex21.pdf")]
    fn test_typed_exhibit_prefers_readable_format(#[case] names: &[&str], #[case] expected: &str) {
        let manifest = FilingManifest {
            entries: names.iter().map(|name| entry(name, "EX-21")).collect(),
        };
        assert_eq!(
            manifest.find_subsidiaries_exhibit().unwrap().entry.document,
            expected
        );
    }

    #[test]
    fn test_untyped_binary_is_ignored() {
        let manifest = FilingManifest {
            entries: vec![entry("ex21.pdf", ""), entry("ex21.jpg", "GRAPHIC")],
        };
        assert!(manifest.find_subsidiaries_exhibit().is_none());
    }

    #[test]
    fn test_directory_listing_fallback() {
        let json = r#"{"directory": {"name": "/Archives/edgar/data/915389/000091538919000010",
            "item": [{"name": "emn-10k.htm"}, {"name": "ex21.htm"}, {"name": "R1.htm"}]}}"#;
        let manifest = FilingManifest::from_directory_json(json.as_bytes(), FOLDER).unwrap();
        let found = manifest.find_subsidiaries_exhibit().unwrap();
        assert_eq!(found.rank, MatchRank::FileName);
        assert_eq!(found.entry.url, format!("{FOLDER}/ex21.htm"));
    }

    #[test]
    fn test_no_exhibit() {
        let manifest = FilingManifest::from_index_html(
            "<table><tr><td>1</td><td>10-K</td><td>main.htm</td><td>10-K</td></tr></table>",
            WWW,
            FOLDER,
        );
        assert_eq!(manifest.len(), 1);
        assert!(manifest.find_subsidiaries_exhibit().is_none());
    }
}

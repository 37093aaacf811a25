//! Plain-text exhibit parsing.
//!
//! Text exhibits are one subsidiary per line, with the jurisdiction separated by a tab, a run of
//! spaces, dot leaders, a trailing parenthetical or a comma. Captions, column headers, page
//! markers and regulatory boilerplate are dropped.

use crate::jurisdiction::{is_corporate_suffix, is_jurisdiction, parse_percent};
use crate::record::SubsidiaryRecord;
use regex::{Regex, RegexSet};
use std::sync::LazyLock;

static BOILERPLATE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^exhibit\b",
        r"(?i)^(list\s+of\s+)?((significant|principal|active|wholly[- ]owned)\s+)?subsidiaries\b",
        r"(?i)^the\s+following\b",
        r"(?i)^(names?|company|companies|entity|entities|subsidiary|subsidiaries)\b.*\b(jurisdiction|state|country|incorporat|organi[sz]|domicile|percent|ownership)",
        r"(?i)^(state|jurisdiction|country|place|domicile)\b.*\b(incorporat|organi[sz]|formation)",
        r"(?i)^(names?(\s+of\s+(subsidiary|subsidiaries|company|entity))?|jurisdiction|ownership|percent(age)?(\s+owned)?|%)$",
        r"(?i)\b(omitted|pursuant\s+to|regulation\s+s-k|item\s+601)\b",
        r"(?i)^(notes?|footnotes?)\b",
        r"^<[^>]*>",
        r"(?i)^page\s+\d+",
        r"^[-\s]*\(?\d+\)?[-\s]*$",
        r"^[-=_*.~\s]{3,}$",
        r":$",
        r"^\*",
        r"^\(\d+\)\s",
    ])
    .expect("valid regex set")
});

static FIELD_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+|\s{2,}|\s*\.{3,}\s*").expect("valid regex"));

static TRAILING_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)[\s,;-]+(\(?\s*\d{1,3}(?:\.\d+)?\s*%\s*\)?)$").expect("valid regex")
});

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\S)\s*\(([^()]+)\)$").expect("valid regex"));

static DESCRIBED_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^an?\s+(.+?)\s+(corporation|company|limited\s+liability\s+company|limited\s+partnership|partnership|trust|entity)$",
    )
    .expect("valid regex")
});

static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\s*(\*+|\(\d{1,2}\)|\[\d{1,2}\]|\u{2020}))+$").expect("valid regex"));

/// Whether a line is a caption, header or boilerplate rather than a subsidiary.
pub(crate) fn is_boilerplate(line: &str) -> bool {
    BOILERPLATE.is_match(line.trim())
}

/// Parse every line of a text exhibit, in order.
pub(crate) fn parse_text(text: &str) -> Vec<SubsidiaryRecord> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse one line into a record, or `None` for blank and boilerplate lines.
pub(crate) fn parse_line(line: &str) -> Option<SubsidiaryRecord> {
    let line = line.trim();
    if line.is_empty() || is_boilerplate(line) {
        return None;
    }

    let mut fields: Vec<&str> = FIELD_DELIMITER
        .split(line)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    let mut ownership = None;
    if let Some(last) = fields.last()
        && fields.len() > 1
        && let Some(percent) = parse_percent(last)
    {
        ownership = Some(percent);
        fields.pop();
    }

    let (name, jurisdiction) = match fields.as_slice() {
        [] => return None,
        [single] => {
            let (rest, percent) = split_trailing_percent(single);
            ownership = ownership.or(percent);
            split_name(rest)
        }
        [first, rest @ ..] => {
            let mut name = (*first).to_string();
            let mut jurisdiction = None;
            for field in rest {
                if is_corporate_suffix(field) && jurisdiction.is_none() {
                    name = format!("{name} {field}");
                } else if let Some(percent) = parse_percent(field) {
                    ownership = ownership.or(Some(percent));
                } else if jurisdiction.is_none() {
                    jurisdiction = Some(jurisdiction_phrase(field).unwrap_or_else(|| field.to_string()));
                }
            }
            (name, jurisdiction)
        }
    };

    let name = clean_name(&name);
    // A lone jurisdiction is a grouping heading, not an entity
    if jurisdiction.is_none() && is_jurisdiction(&name) {
        return None;
    }

    SubsidiaryRecord::new(name)
        .map(|r| r.with_jurisdiction(jurisdiction).with_ownership(ownership))
}

fn split_trailing_percent(field: &str) -> (&str, Option<f64>) {
    TRAILING_PERCENT
        .captures(field)
        .and_then(|c| {
            let percent = parse_percent(c.get(2)?.as_str())?;
            Some((c.get(1)?.as_str(), Some(percent)))
        })
        .unwrap_or((field, None))
}

/// Split a single delimiter-free field into name and jurisdiction.
fn split_name(field: &str) -> (String, Option<String>) {
    if let Some(captures) = TRAILING_PARENTHETICAL.captures(field)
        && let (Some(outer), Some(inner)) = (captures.get(1), captures.get(2))
        && let Some(jurisdiction) = jurisdiction_phrase(inner.as_str())
    {
        return (outer.as_str().to_string(), Some(jurisdiction));
    }

    // Leftmost comma whose tail is a jurisdiction, so "Acme, Inc., Delaware, USA" keeps
    // "Acme, Inc." together and reads "Delaware, USA" as the jurisdiction.
    for (idx, _) in field.match_indices(',') {
        let tail = field[idx + 1..].trim();
        if tail.is_empty() || is_corporate_suffix(tail) {
            continue;
        }
        if let Some(jurisdiction) = jurisdiction_phrase(tail) {
            return (field[..idx].to_string(), Some(jurisdiction));
        }
    }

    (field.to_string(), None)
}

/// Read a jurisdiction from a bare name ("Delaware") or a description ("a Delaware corporation").
fn jurisdiction_phrase(s: &str) -> Option<String> {
    let s = s.trim();
    if is_jurisdiction(s) {
        return Some(s.to_string());
    }
    DESCRIBED_ENTITY
        .captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|j| is_jurisdiction(j))
        .map(str::to_string)
}

/// Strip footnote markers and dangling punctuation from a name.
pub(crate) fn clean_name(name: &str) -> String {
    let name = FOOTNOTE_MARKER.replace(name.trim(), "");
    name.trim_end_matches([',', ';', ':', '-'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parsed(line: &str) -> (String, Option<String>, Option<f64>) {
        let record = parse_line(line).unwrap_or_else(|| panic!("no record for {line:?}"));
        (
            record.name().to_string(),
            record.jurisdiction().map(str::to_string),
            record.ownership_percent(),
        )
    }

    #[rstest]
    #[case("Tennessee Eastman Company, Tennessee", "Tennessee Eastman Company", Some("Tennessee"), None)]
    #[case("Acme, Inc.", "Acme, Inc.", None, None)]
    #[case("Acme, Inc., Delaware", "Acme, Inc.", Some("Delaware"), None)]
    #[case("Acme Holdings B.V.\tThe Netherlands", "Acme Holdings B.V.", Some("The Netherlands"), None)]
    #[case("Eastman Chemical Ltd.      England and Wales", "Eastman Chemical Ltd.", Some("England and Wales"), None)]
    #[case("Eastman (Shanghai) Co. ......... China", "Eastman (Shanghai) Co.", Some("China"), None)]
    #[case("Acme GmbH (Germany)", "Acme GmbH", Some("Germany"), None)]
    #[case("Acme Holdings (Europe)", "Acme Holdings (Europe)", None, None)]
    #[case("Acme Ventures LLC, a Delaware limited liability company", "Acme Ventures LLC", Some("Delaware"), None)]
    #[case("Acme Japan K.K.    Japan    51%", "Acme Japan K.K.", Some("Japan"), Some(51.0))]
    #[case("Acme Brasil Ltda., Brazil (60%)", "Acme Brasil Ltda.", Some("Brazil"), Some(60.0))]
    #[case("Acme Funding Corp.*", "Acme Funding Corp.", None, None)]
    #[case("Acme Capital LLC (1)", "Acme Capital LLC", None, None)]
    #[case("Acme Services    Ontario, Canada", "Acme Services", Some("Ontario, Canada"), None)]
    #[case("Acme Chemical   Co.   Delaware", "Acme Chemical Co.", Some("Delaware"), None)]
    fn test_parse_line(
        #[case] line: &str,
        #[case] name: &str,
        #[case] jurisdiction: Option<&str>,
        #[case] ownership: Option<f64>,
    ) {
        let (n, j, o) = parsed(line);
        assert_eq!(n, name);
        assert_eq!(j.as_deref(), jurisdiction);
        assert_eq!(o, ownership);
    }

    #[rstest]
    #[case("EXHIBIT 21")]
    #[case("Exhibit 21.1 - Subsidiaries of the Registrant")]
    #[case("SUBSIDIARIES OF EASTMAN CHEMICAL COMPANY")]
    #[case("List of Significant Subsidiaries")]
    #[case("Name of Subsidiary            Jurisdiction of Incorporation")]
    #[case("State or Other Jurisdiction of Incorporation or Organization")]
    #[case("NAME")]
    #[case("The following is a list of subsidiaries of the Company.")]
    #[case("Certain subsidiaries have been omitted pursuant to Item 601(b)(21)(ii) of Regulation S-K.")]
    #[case("<PAGE>")]
    #[case("<S>                         <C>")]
    #[case("- 2 -")]
    #[case("Page 3")]
    #[case("-----------------------------")]
    #[case("Foreign Subsidiaries:")]
    #[case("* Less than wholly owned")]
    #[case("(1) Joint venture")]
    fn test_boilerplate_dropped(#[case] line: &str) {
        assert!(parse_line(line).is_none(), "{line:?} should be dropped");
    }

    #[test]
    fn test_lone_jurisdiction_is_heading() {
        assert!(parse_line("Delaware").is_none());
    }

    #[test]
    fn test_parse_text_preserves_order_and_duplicates() {
        let text = "SUBSIDIARIES OF THE REGISTRANT\n\n\
                    Name                         State of Incorporation\n\
                    Eastman Chemical Co.         Delaware\n\
                    \n\
                    Eastman Chemical Co.         Delaware\n\
                    Tennessee Eastman Company, Tennessee\n";

        let records = parse_text(text);

        let names: Vec<_> = records.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["Eastman Chemical Co.", "Eastman Chemical Co.", "Tennessee Eastman Company"]
        );
    }
}

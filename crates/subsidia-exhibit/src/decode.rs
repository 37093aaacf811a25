//! Body decoding and SGML envelope handling.
//!
//! Exhibits from the early 2000s are often Windows-1252 and wrapped in the full-submission SGML
//! envelope (`<DOCUMENT>`, `<TYPE>`, `<TEXT>`). Both are normalized here before parsing.

use crate::error::{ExhibitError, Result};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Share of control bytes above which a body is treated as binary.
const MAX_CONTROL_RATIO: f64 = 0.01;

/// Windows-1252 characters for bytes 0x80..=0x9F. Unassigned bytes keep their Latin-1 value.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

static TEXT_ENVELOPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<TEXT>(.*?)(?:</TEXT>|\z)").expect("valid regex"));

static HTML_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(html|body|td|tr)[\s>]").expect("valid regex"));

/// Decode a document body to text.
///
/// UTF-8 is tried first (with any byte-order mark removed). Bodies that are not valid UTF-8 but
/// look textual are read as Windows-1252, the Latin-1 superset older filings were typed in.
pub(crate) fn decode_body<'a>(url: &str, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if bytes.contains(&0) {
        return Err(undecodable(url, "contains NUL bytes"));
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(Cow::Borrowed(text));
    }

    let control = bytes
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c))
        .count();
    if control as f64 > bytes.len() as f64 * MAX_CONTROL_RATIO {
        return Err(undecodable(url, "binary content"));
    }

    tracing::debug!(url, "body is not UTF-8, decoding as Windows-1252");
    Ok(Cow::Owned(bytes.iter().map(|&b| cp1252_char(b)).collect()))
}

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// Strip an SGML submission envelope, returning the `<TEXT>` payload when present.
pub(crate) fn unwrap_envelope(text: &str) -> &str {
    TEXT_ENVELOPE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
}

/// Whether a text payload is really HTML (an HTML exhibit inside an SGML envelope).
///
/// SGML `<TABLE>` blocks with `<S>`/`<C>` column markers stay on the text path.
pub(crate) fn is_html_markup(text: &str) -> bool {
    HTML_MARKUP.is_match(text)
}

fn undecodable(url: &str, reason: &str) -> ExhibitError {
    ExhibitError::Undecodable {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

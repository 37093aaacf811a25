//! Recognition of jurisdiction names and ownership percentages.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const US_STATES: &[&str] = &[
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa", "kansas",
    "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan", "minnesota",
    "mississippi", "missouri", "montana", "nebraska", "nevada", "new hampshire", "new jersey",
    "new mexico", "new york", "north carolina", "north dakota", "ohio", "oklahoma", "oregon",
    "pennsylvania", "rhode island", "south carolina", "south dakota", "tennessee", "texas", "utah",
    "vermont", "virginia", "washington", "west virginia", "wisconsin", "wyoming",
    "district of columbia", "puerto rico", "guam", "u.s. virgin islands",
];

const US_STATE_CODES: &[&str] = &[
    "al", "ak", "az", "ar", "ca", "co", "ct", "de", "fl", "ga", "hi", "id", "il", "in", "ia", "ks",
    "ky", "la", "me", "md", "ma", "mi", "mn", "ms", "mo", "mt", "ne", "nv", "nh", "nj", "nm", "ny",
    "nc", "nd", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut", "vt", "va", "wa", "wv",
    "wi", "wy", "dc", "pr",
];

const COUNTRIES: &[&str] = &[
    "argentina", "australia", "austria", "bahamas", "bahrain", "bangladesh", "barbados", "belgium",
    "bermuda", "bolivia", "brazil", "british virgin islands", "bulgaria", "canada",
    "cayman islands", "channel islands", "chile", "china", "colombia", "costa rica", "croatia",
    "cyprus", "czech republic", "czechia", "denmark", "dominican republic", "ecuador", "egypt",
    "el salvador", "england", "england and wales", "estonia", "finland", "france", "germany",
    "ghana", "gibraltar", "greece", "guatemala", "guernsey", "honduras", "hong kong", "hungary",
    "iceland", "india", "indonesia", "ireland", "isle of man", "israel", "italy", "jamaica",
    "japan", "jersey", "jordan", "kazakhstan", "kenya", "korea", "south korea",
    "republic of korea", "kuwait", "latvia", "lebanon", "liechtenstein", "lithuania",
    "luxembourg", "macau", "malaysia", "malta", "mauritius", "mexico", "monaco", "morocco",
    "netherlands", "netherlands antilles", "new zealand", "nicaragua", "nigeria",
    "northern ireland", "norway", "oman", "pakistan", "panama", "paraguay", "peru",
    "philippines", "poland", "portugal", "qatar", "romania", "russia", "russian federation",
    "saudi arabia", "scotland", "serbia", "singapore", "slovakia", "slovak republic", "slovenia",
    "south africa", "spain", "sri lanka", "sweden", "switzerland", "taiwan", "thailand",
    "trinidad and tobago", "tunisia", "turkey", "turkiye", "ukraine", "united arab emirates",
    "uae", "united kingdom", "uk", "united states", "united states of america", "usa", "us",
    "uruguay", "venezuela", "vietnam", "viet nam", "wales", "people's republic of china", "prc",
];

/// Prefixes that qualify a jurisdiction without changing it ("State of Delaware").
const QUALIFIERS: &[&str] = &["state of ", "commonwealth of ", "province of ", "republic of ", "kingdom of "];

/// Legal-form suffixes that end entity names; never read as jurisdictions.
const CORPORATE_SUFFIXES: &[&str] = &[
    "inc", "incorporated", "corp", "corporation", "co", "company", "ltd", "limited", "llc",
    "l.l.c", "lp", "l.p", "llp", "plc", "sa", "s.a", "ag", "gmbh", "bv", "b.v", "nv", "n.v",
    "srl", "s.r.l", "sarl", "s.a.r.l", "spa", "s.p.a", "pty", "pte", "kk", "k.k", "ab", "as",
    "a/s", "oy", "sas", "s.a.s", "de c.v", "s.a. de c.v", "ulc", "lda", "bhd", "sdn bhd",
];

static KNOWN: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    US_STATES
        .iter()
        .chain(US_STATE_CODES)
        .chain(COUNTRIES)
        .copied()
        .collect()
});

static PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?\s*(\d{1,3}(?:\.\d+)?)\s*%\s*\)?$").expect("valid regex")
});

fn normalize(s: &str) -> String {
    let lowered = s
        .trim()
        .trim_matches(|c: char| matches!(c, '(' | ')' | ',' | ';' | ':'))
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let without_article = lowered.strip_prefix("the ").unwrap_or(&lowered);
    if without_article.len() <= 6 {
        // "U.S.A." and "U.K." style abbreviations
        without_article.replace('.', "")
    } else {
        without_article.trim_end_matches('.').to_string()
    }
}

/// Whether `s` names a known jurisdiction.
///
/// Accepts US states and their postal codes, countries, qualified forms ("State of Delaware")
/// and comma-joined compounds whose parts are all known ("Ontario, Canada" is rejected because
/// Ontario is unknown; "Delaware, USA" is accepted).
pub fn is_jurisdiction(s: &str) -> bool {
    // "Co." collides with the Colorado postal code
    if is_corporate_suffix(s) {
        return false;
    }
    let normalized = normalize(s);
    if normalized.is_empty() {
        return false;
    }
    if is_known(&normalized) {
        return true;
    }
    if normalized.contains(',') {
        return normalized.split(',').all(|part| is_known(&normalize(part)));
    }
    false
}

fn is_known(normalized: &str) -> bool {
    if KNOWN.contains(normalized) {
        return true;
    }
    QUALIFIERS
        .iter()
        .filter_map(|q| normalized.strip_prefix(q))
        .any(|rest| KNOWN.contains(rest))
}

/// Whether `s` is a bare legal-form suffix ("Inc.", "S.A. de C.V.").
pub fn is_corporate_suffix(s: &str) -> bool {
    let normalized = s.trim().trim_end_matches('.').to_lowercase();
    CORPORATE_SUFFIXES.contains(&normalized.as_str())
}

/// Parse an ownership token such as `"100%"`, `"(51.5%)"` or `"60 %"`.
///
/// Values above 100 are rejected.
pub fn parse_percent(s: &str) -> Option<f64> {
    let captures = PERCENT.captures(s.trim())?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    (0.0..=100.0).contains(&value).then_some(value)
}

/// Parse an ownership column cell, where the percent sign is often omitted (`"100"`).
pub(crate) fn parse_ownership_cell(s: &str) -> Option<f64> {
    parse_percent(s).or_else(|| {
        let value: f64 = s.trim().parse().ok()?;
        (0.0..=100.0).contains(&value).then_some(value)
    })
}

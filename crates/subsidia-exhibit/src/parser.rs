//! Exhibit parser entry point.

use crate::decode::{decode_body, is_html_markup, unwrap_envelope};
use crate::error::Result;
use crate::html::parse_html;
use crate::record::SubsidiaryRecord;
use crate::strategy::{TableStrategy, default_strategies};
use crate::text::parse_text;
use subsidia_edgar::{ContentType, RawDocument};

/// Turns exhibit documents into ordered subsidiary records.
///
/// Parsing is deterministic: the same bytes always yield the same records. A document without
/// recognizable entries yields an empty vector, not an error.
#[derive(Debug)]
pub struct ExhibitParser {
    strategies: Vec<Box<dyn TableStrategy>>,
}

impl Default for ExhibitParser {
    fn default() -> Self {
        Self::with_strategies(default_strategies())
    }
}

impl ExhibitParser {
    /// Parser with the default table strategy chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a custom strategy chain, tried in order.
    pub fn with_strategies(strategies: Vec<Box<dyn TableStrategy>>) -> Self {
        Self { strategies }
    }

    /// Parse a fetched exhibit.
    ///
    /// # Errors
    /// Returns [`crate::ExhibitError::Undecodable`] when the body is binary or in no supported
    /// encoding.
    pub fn parse(&self, document: &RawDocument) -> Result<Vec<SubsidiaryRecord>> {
        let text = decode_body(&document.url, &document.body)?;

        let records = match document.content_type {
            ContentType::Html => parse_html(&text, &self.strategies),
            ContentType::Text => {
                let payload = unwrap_envelope(&text);
                if is_html_markup(payload) {
                    parse_html(payload, &self.strategies)
                } else {
                    parse_text(payload)
                }
            }
        };

        tracing::debug!(
            url = %document.url,
            content_type = %document.content_type,
            records = records.len(),
            "parsed exhibit"
        );
        Ok(records)
    }
}

//! Raw documents handed from the fetcher to the exhibit parser.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Broad content type of a fetched document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text (including SGML `.txt` submissions)
    #[display("text")]
    Text,
    /// HTML or XHTML
    #[display("html")]
    Html,
}

impl ContentType {
    /// Classify a document from its `Content-Type` header and URL.
    ///
    /// The header wins when it names text or HTML; otherwise the URL extension decides,
    /// and anything unrecognized is treated as HTML since that is what EDGAR serves most.
    pub fn detect(header: Option<&str>, url: &str) -> Self {
        if let Some(header) = header {
            let header = header.to_ascii_lowercase();
            if header.contains("html") {
                return Self::Html;
            }
            if header.starts_with("text/plain") {
                return Self::Text;
            }
        }

        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
        if path.ends_with(".txt") || path.ends_with(".text") {
            Self::Text
        } else {
            Self::Html
        }
    }
}

/// A fetched document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Source URL
    pub url: String,
    /// Content type
    pub content_type: ContentType,
    /// Undecoded body bytes
    pub body: Vec<u8>,
}

impl RawDocument {
    /// Create a new raw document.
    pub fn new(url: impl Into<String>, content_type: ContentType, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            content_type,
            body: body.into(),
        }
    }

    /// Convenience constructor for plain-text documents.
    pub fn text(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(url, ContentType::Text, body)
    }

    /// Convenience constructor for HTML documents.
    pub fn html(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(url, ContentType::Html, body)
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

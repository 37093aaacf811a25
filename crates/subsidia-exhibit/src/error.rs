//! Error types for exhibit parsing.

use thiserror::Error;

/// Result type for exhibit parsing.
pub type Result<T> = std::result::Result<T, ExhibitError>;

/// Errors that can occur while parsing an exhibit.
///
/// Absence of recognizable data is not an error: parsers return an empty sequence instead.
#[derive(Debug, Error)]
pub enum ExhibitError {
    /// The body is not text in any supported encoding
    #[error("Undecodable document {url}: {reason}")]
    Undecodable {
        /// Source URL
        url: String,
        /// Why decoding failed
        reason: String,
    },
}

//! Error types for EDGAR operations.

use thiserror::Error;

/// Result type for EDGAR operations.
pub type Result<T> = std::result::Result<T, EdgarError>;

/// Errors that can occur while talking to SEC EDGAR.
#[derive(Debug, Error)]
pub enum EdgarError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ticker not present in the EDGAR ticker directory
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The requested filing or exhibit does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status that is not retried
    #[error("HTTP error {status} for {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Connection-level failure after exhausting retries
    #[error("Network error for {url}: {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// Underlying failure description
        reason: String,
    },

    /// Throttled by the server on every attempt
    #[error("Rate limit exceeded for {url} after {attempts} attempts")]
    RateLimitExceeded {
        /// Requested URL
        url: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Date in an EDGAR payload could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl EdgarError {
    /// Returns true when the error means "this resource does not exist" rather than a failure.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Http { status: 404, .. })
    }

    /// Returns true when the error must abort a whole run.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::UnknownSymbol(_))
    }
}

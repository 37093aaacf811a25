#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/subsidia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod index;
pub mod manifest;
pub mod resolver;
pub mod submissions;

pub use config::{FetcherConfig, RetryPolicy};
pub use context::{EdgarUrls, RunContext};
pub use document::{ContentType, RawDocument};
pub use error::{EdgarError, Result};
pub use fetcher::{FetchStats, Fetcher, Transport, TransportError, TransportResponse};
pub use index::{FilingIndexClient, FilingLookup, FilingReference};
pub use manifest::{ExhibitMatch, FilingManifest, ManifestEntry, MatchRank};
pub use resolver::{FilerIdentity, IdentifierResolver, TickerDirectory};
pub use submissions::{FilingInfo, SubmissionIndex, YearCandidates};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

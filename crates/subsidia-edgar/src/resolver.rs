//! Ticker symbol to CIK resolution.
//!
//! CIK (Central Index Key) is the permanent identifier the SEC assigns to every filer. It does
//! not change when a company changes its ticker, so everything downstream keys on it.

use crate::context::RunContext;
use crate::error::{EdgarError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved filer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilerIdentity {
    /// Ticker symbol as listed in the directory
    pub symbol: String,
    /// CIK, zero-padded to 10 digits
    pub stable_id: String,
    /// Company name as registered with the SEC
    pub display_name: String,
}

/// Raw company ticker entry from SEC JSON.
///
/// The SEC returns: `{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}`
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: u64,
    ticker: String,
    title: String,
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    ticker: String,
    cik: u64,
    title: String,
}

/// Lookup table for converting ticker symbols to CIK numbers.
#[derive(Debug, Clone, Default)]
pub struct TickerDirectory {
    exact: HashMap<String, DirectoryEntry>,
    folded: HashMap<String, DirectoryEntry>,
}

impl TickerDirectory {
    /// Parse the `company_tickers.json` payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let data: HashMap<String, CompanyTicker> = serde_json::from_slice(bytes)
            .map_err(|e| EdgarError::Decode(format!("invalid ticker directory: {e}")))?;

        // Insert in the directory's own order so the first listing of a ticker wins.
        let mut rows: Vec<(u64, CompanyTicker)> = data
            .into_iter()
            .map(|(idx, company)| (idx.parse().unwrap_or(u64::MAX), company))
            .collect();
        rows.sort_by_key(|(idx, _)| *idx);

        let mut directory = Self::default();
        for (_, company) in rows {
            let entry = DirectoryEntry {
                ticker: company.ticker.clone(),
                cik: company.cik_str,
                title: company.title,
            };
            directory
                .folded
                .entry(company.ticker.to_uppercase())
                .or_insert_with(|| entry.clone());
            directory.exact.entry(company.ticker).or_insert(entry);
        }

        Ok(directory)
    }

    /// Look up a symbol: exact match first, then case-insensitive.
    pub fn lookup(&self, symbol: &str) -> Option<FilerIdentity> {
        let symbol = symbol.trim();
        self.exact
            .get(symbol)
            .or_else(|| self.folded.get(&symbol.to_uppercase()))
            .map(|entry| FilerIdentity {
                symbol: entry.ticker.clone(),
                stable_id: pad_cik(entry.cik),
                display_name: entry.title.clone(),
            })
    }

    /// Number of distinct tickers.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// Pad a CIK to the 10 digits EDGAR URLs require.
///
/// # Example
/// ```
/// # use subsidia_edgar::resolver::pad_cik;
/// assert_eq!(pad_cik(915389), "0000915389");
/// ```
pub fn pad_cik(cik: u64) -> String {
    format!("{:010}", cik)
}

/// Resolves ticker symbols against the run's cached ticker directory.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierResolver<'a> {
    ctx: &'a RunContext,
}

impl<'a> IdentifierResolver<'a> {
    /// Create a resolver over a run context.
    pub const fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Resolve a symbol to its filer identity.
    ///
    /// The ticker directory is fetched once per run; resolved identities are cached.
    ///
    /// # Errors
    /// Returns [`EdgarError::UnknownSymbol`] when the symbol is blank or not listed.
    pub async fn resolve(&self, symbol: &str) -> Result<FilerIdentity> {
        let key = symbol.trim().to_uppercase();
        if key.is_empty() {
            return Err(EdgarError::UnknownSymbol(symbol.to_string()));
        }

        if let Some(identity) = self.ctx.cached_identity(&key) {
            return Ok(identity);
        }

        let directory = self.ctx.ticker_directory().await?;
        let identity = directory.lookup(symbol).ok_or_else(|| {
            tracing::warn!(symbol, "symbol not found in ticker directory");
            EdgarError::UnknownSymbol(symbol.to_string())
        })?;

        tracing::info!(
            symbol = %identity.symbol,
            cik = %identity.stable_id,
            name = %identity.display_name,
            "resolved filer"
        );
        self.ctx.cache_identity(key, identity.clone());
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTORY: &str = r#"{
        "0": {"cik_str": 915389, "ticker": "EMN", "title": "EASTMAN CHEMICAL CO"},
        "1": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
        "2": {"cik_str": 1067983, "ticker": "BRK-B", "title": "BERKSHIRE HATHAWAY INC"}
    }"#;

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik(320193), "0000320193");
        assert_eq!(pad_cik(1234), "0000001234");
        assert_eq!(pad_cik(1234567890), "1234567890");
    }

    #[test]
    fn test_lookup_exact() {
        let directory = TickerDirectory::from_json(DIRECTORY.as_bytes()).unwrap();
        let identity = directory.lookup("EMN").unwrap();
        assert_eq!(identity.stable_id, "0000915389");
        assert_eq!(identity.display_name, "EASTMAN CHEMICAL CO");
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let directory = TickerDirectory::from_json(DIRECTORY.as_bytes()).unwrap();
        let identity = directory.lookup(" brk-b ").unwrap();
        assert_eq!(identity.symbol, "BRK-B");
        assert_eq!(identity.stable_id, "0001067983");
    }

    #[test]
    fn test_lookup_missing() {
        let directory = TickerDirectory::from_json(DIRECTORY.as_bytes()).unwrap();
        assert!(directory.lookup("ZZZZZ_NOT_REAL").is_none());
    }

    #[test]
    fn test_invalid_directory() {
        assert!(matches!(
            TickerDirectory::from_json(b"[1, 2]"),
            Err(EdgarError::Decode(_))
        ));
    }
}

//! Run-scoped state: the fetcher and every cache a run fills.
//!
//! A [`RunContext`] replaces process-wide globals. Each run (and each test) builds its own, and
//! everything it cached is dropped with it.

use crate::config::FetcherConfig;
use crate::error::{EdgarError, Result};
use crate::fetcher::{FetchStats, Fetcher, Transport};
use crate::resolver::{FilerIdentity, TickerDirectory};
use crate::submissions::SubmissionIndex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OnceCell};

/// SEC EDGAR www host
pub const SEC_WWW_BASE_URL: &str = "https://www.sec.gov";

/// SEC EDGAR data API host
pub const SEC_DATA_BASE_URL: &str = "https://data.sec.gov";

/// Base URLs of the EDGAR endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgarUrls {
    /// Host serving the ticker directory and filing archives
    pub www: String,
    /// Host serving the submissions API
    pub data: String,
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            www: SEC_WWW_BASE_URL.to_string(),
            data: SEC_DATA_BASE_URL.to_string(),
        }
    }
}

impl EdgarUrls {
    /// Full ticker-to-CIK directory.
    pub fn ticker_directory(&self) -> String {
        format!("{}/files/company_tickers.json", self.www)
    }

    /// Submission index for a zero-padded CIK.
    pub fn submissions(&self, stable_id: &str) -> String {
        format!("{}/submissions/CIK{}.json", self.data, stable_id)
    }

    /// Overflow page of a submission index.
    pub fn submissions_page(&self, name: &str) -> String {
        format!("{}/submissions/{}", self.data, name)
    }

    /// Archive folder of one filing.
    pub fn filing_folder(&self, stable_id: &str, accession: &str) -> String {
        let cik = stable_id.trim_start_matches('0');
        format!(
            "{}/Archives/edgar/data/{}/{}",
            self.www,
            if cik.is_empty() { "0" } else { cik },
            accession.replace('-', "")
        )
    }

    /// Human-readable filing index page listing every document of a filing.
    pub fn filing_index_page(&self, stable_id: &str, accession: &str) -> String {
        format!(
            "{}/{}-index.htm",
            self.filing_folder(stable_id, accession),
            accession
        )
    }

    /// JSON directory listing of a filing folder.
    pub fn filing_directory(&self, stable_id: &str, accession: &str) -> String {
        format!("{}/index.json", self.filing_folder(stable_id, accession))
    }
}

/// Fetcher plus run-scoped caches.
pub struct RunContext {
    fetcher: Fetcher,
    urls: EdgarUrls,
    directory: OnceCell<TickerDirectory>,
    identities: Mutex<HashMap<String, FilerIdentity>>,
    submissions: AsyncMutex<HashMap<String, SubmissionIndex>>,
}

impl RunContext {
    /// Create a context talking to the real EDGAR hosts.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        Ok(Self::from_fetcher(Fetcher::new(config)?, EdgarUrls::default()))
    }

    /// Create a context over a custom transport and base URLs.
    pub fn with_transport(
        config: FetcherConfig,
        transport: Arc<dyn Transport>,
        urls: EdgarUrls,
    ) -> Result<Self> {
        Ok(Self::from_fetcher(
            Fetcher::with_transport(config, transport)?,
            urls,
        ))
    }

    /// Wrap an existing fetcher.
    pub fn from_fetcher(fetcher: Fetcher, urls: EdgarUrls) -> Self {
        Self {
            fetcher,
            urls,
            directory: OnceCell::new(),
            identities: Mutex::new(HashMap::new()),
            submissions: AsyncMutex::new(HashMap::new()),
        }
    }

    /// The run's fetcher.
    pub const fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Endpoint URLs.
    pub const fn urls(&self) -> &EdgarUrls {
        &self.urls
    }

    /// Fetcher counters so far.
    pub fn stats(&self) -> FetchStats {
        self.fetcher.stats()
    }

    /// Ticker directory, fetched on first use.
    pub(crate) async fn ticker_directory(&self) -> Result<&TickerDirectory> {
        self.directory
            .get_or_try_init(|| async {
                let url = self.urls.ticker_directory();
                tracing::info!(%url, "loading ticker directory");
                let doc = self.fetcher.get(&url).await?;
                let directory = TickerDirectory::from_json(&doc.body)?;
                tracing::debug!(entries = directory.len(), "ticker directory loaded");
                Ok::<_, EdgarError>(directory)
            })
            .await
    }

    pub(crate) fn cached_identity(&self, key: &str) -> Option<FilerIdentity> {
        self.identities
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    pub(crate) fn cache_identity(&self, key: String, identity: FilerIdentity) {
        if let Ok(mut cache) = self.identities.lock() {
            cache.insert(key, identity);
        }
    }

    pub(crate) const fn submissions(&self) -> &AsyncMutex<HashMap<String, SubmissionIndex>> {
        &self.submissions
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("urls", &self.urls)
            .field("fetcher", &self.fetcher)
            .field("directory_loaded", &self.directory.initialized())
            .finish_non_exhaustive()
    }
}

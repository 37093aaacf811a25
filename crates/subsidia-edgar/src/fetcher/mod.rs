//! Rate-limited fetcher: the single chokepoint for all outbound requests.
//!
//! Every request goes through [`Fetcher::get`], which
//! - attaches the configured identification `User-Agent`,
//! - holds a mutex-protected rate token so requests are spaced by the minimum interval,
//! - retries throttling (429 / 5xx) and connection failures with exponential backoff.
//!
//! A 404 is returned immediately as [`EdgarError::Http`] without retrying.
//!
//! # Example
//!
//! ```no_run
//! use subsidia_edgar::{Fetcher, FetcherConfig};
//!
//! # async fn example() -> subsidia_edgar::Result<()> {
//! let fetcher = Fetcher::new(FetcherConfig::with_user_agent("Jane Doe jane@example.com"))?;
//! let doc = fetcher.get("https://www.sec.gov/files/company_tickers.json").await?;
//! println!("{} bytes", doc.len());
//! # Ok(())
//! # }
//! ```

pub mod backoff;
mod rate_limit;
pub mod transport;

pub use backoff::{Backoff, Decision, RetryClass};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

use crate::config::{FetcherConfig, RetryPolicy};
use crate::document::{ContentType, RawDocument};
use crate::error::{EdgarError, Result};
use rate_limit::RateLimiter;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Snapshot of fetcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Requests sent, including retries
    pub requests: u64,
    /// Retries performed after transient failures
    pub retries: u64,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    retries: AtomicU64,
}

/// Rate-limited, retrying HTTP fetcher.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    rate_limiter: Mutex<RateLimiter>,
    user_agent: String,
    retry: RetryPolicy,
    counters: Counters,
}

impl Fetcher {
    /// Create a fetcher using the `reqwest` transport.
    ///
    /// # Errors
    /// Returns [`EdgarError::Configuration`] if no identification User-Agent is configured.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        config.require_user_agent()?;
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a fetcher over a custom transport.
    ///
    /// # Errors
    /// Returns [`EdgarError::Configuration`] if no identification User-Agent is configured.
    pub fn with_transport(config: FetcherConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let user_agent = config.require_user_agent()?.to_string();

        Ok(Self {
            transport,
            rate_limiter: Mutex::new(RateLimiter::new(config.min_interval)),
            user_agent,
            retry: config.retry,
            counters: Counters::default(),
        })
    }

    /// Fetch a document.
    ///
    /// # Errors
    /// - [`EdgarError::Http`] for 404 and other non-retryable statuses
    /// - [`EdgarError::RateLimitExceeded`] when throttling persists past the retry budget
    /// - [`EdgarError::Network`] when connection failures persist past the retry budget
    pub async fn get(&self, url: &str) -> Result<RawDocument> {
        let mut backoff = Backoff::new(&self.retry);

        loop {
            let outcome = {
                // The rate token is held for the whole request so calls never overlap.
                let mut limiter = self.rate_limiter.lock().await;
                limiter.wait().await;
                self.counters.requests.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(url, attempt = backoff.attempts() + 1, "GET");
                self.transport.get(url, &self.user_agent).await
            };

            let (class, retry_after, reason) = match outcome {
                Ok(response) if response.is_success() => {
                    let content_type =
                        ContentType::detect(response.content_type.as_deref(), url);
                    tracing::debug!(url, bytes = response.body.len(), %content_type, "fetched");
                    return Ok(RawDocument::new(url, content_type, response.body));
                }
                Ok(response) if is_transient(response.status) => (
                    RetryClass::Throttled,
                    response.retry_after,
                    format!("HTTP {}", response.status),
                ),
                Ok(response) => {
                    return Err(EdgarError::Http {
                        status: response.status,
                        url: url.to_string(),
                    });
                }
                Err(e) => (RetryClass::Network, None, e.0),
            };

            match backoff.on_failure(class, retry_after) {
                Decision::Retry(delay) => {
                    tracing::warn!(
                        url,
                        %reason,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, backing off"
                    );
                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    sleep(delay).await;
                }
                Decision::GiveUp => {
                    tracing::error!(url, %reason, attempts = backoff.attempts(), "giving up");
                    return Err(match class {
                        RetryClass::Throttled => EdgarError::RateLimitExceeded {
                            url: url.to_string(),
                            attempts: backoff.attempts_for(RetryClass::Throttled),
                        },
                        RetryClass::Network => EdgarError::Network {
                            url: url.to_string(),
                            reason,
                        },
                    });
                }
            }
        }
    }

    /// Fetch a document and deserialize it as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let doc = self.get(url).await?;
        serde_json::from_slice(&doc.body)
            .map_err(|e| EdgarError::Decode(format!("invalid JSON from {url}: {e}")))
    }

    /// Current request and retry counters.
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
        }
    }

    /// Identification string attached to every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Statuses worth retrying: throttling and transient server errors.
const fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

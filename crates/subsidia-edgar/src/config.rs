//! Fetcher configuration.

use crate::error::{EdgarError, Result};
use std::time::Duration;

/// Default spacing between requests. EDGAR allows at most 10 requests per second.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(110);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable consulted for the identification header.
pub const USER_AGENT_ENV: &str = "SUBSIDIA_USER_AGENT";

/// Retry policy for transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts (including the first) when throttled (429/503 class)
    pub max_rate_limit_attempts: u32,
    /// Maximum attempts (including the first) on connection failures
    pub max_network_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Fixed seed for jitter, for reproducible schedules
    pub jitter_seed: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_attempts: 5,
            max_network_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter_seed: None,
        }
    }
}

/// Configuration for the rate-limited fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Identification string sent as `User-Agent` (e.g. "Jane Doe jane@example.com")
    pub user_agent: Option<String>,
    /// Minimum duration between two requests
    pub min_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry behaviour
    pub retry: RetryPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl FetcherConfig {
    /// Create a configuration with the given identification string.
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            ..Self::default()
        }
    }

    /// Create a configuration reading the identification string from `SUBSIDIA_USER_AGENT`.
    pub fn from_env() -> Self {
        Self {
            user_agent: std::env::var(USER_AGENT_ENV).ok(),
            ..Self::default()
        }
    }

    /// Set the minimum interval between requests.
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Return the trimmed identification string, or a configuration error if it is unset.
    pub fn require_user_agent(&self) -> Result<&str> {
        match self.user_agent.as_deref().map(str::trim) {
            Some(ua) if !ua.is_empty() => Ok(ua),
            _ => Err(EdgarError::Configuration(format!(
                "an identification User-Agent is required (set --user-agent or {USER_AGENT_ENV})"
            ))),
        }
    }
}

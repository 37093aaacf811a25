//! Minimum-interval pacing between requests.

use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Rate token ensuring requests are spaced at least `min_interval` apart.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    /// Wait until the next request may go out and claim the slot. Returns the time waited.
    pub(crate) async fn wait(&mut self) -> Duration {
        let mut waited = Duration::ZERO;
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                sleep(waited).await;
            }
        }
        self.last_request = Some(Instant::now());
        waited
    }
}

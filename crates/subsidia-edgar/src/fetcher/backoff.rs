//! Retry bookkeeping for transient failures.
//!
//! [`Backoff`] is a small state machine: it tracks how many attempts of each [`RetryClass`] have
//! failed and the un-jittered delay for the next retry. Each failed attempt is fed in with its
//! class and the machine answers with a [`Decision`]. The two classes have separate budgets, so
//! throttling never uses up the retries owed to a connection failure.

use crate::config::RetryPolicy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Kind of transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Server throttling or overload (429, 5xx)
    Throttled,
    /// Connection-level failure
    Network,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Sleep for the given duration, then try again
    Retry(Duration),
    /// Attempts for this class are exhausted
    GiveUp,
}

/// Exponential backoff with jitter.
#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    throttled_attempts: u32,
    network_attempts: u32,
    next_delay: Duration,
    rng: StdRng,
}

impl Backoff {
    /// Start a fresh schedule for one logical request.
    pub fn new(policy: &RetryPolicy) -> Self {
        let rng = policy
            .jitter_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            policy: policy.clone(),
            throttled_attempts: 0,
            network_attempts: 0,
            next_delay: policy.base_delay,
            rng,
        }
    }

    /// Number of failed attempts recorded so far, across both classes.
    pub const fn attempts(&self) -> u32 {
        self.throttled_attempts + self.network_attempts
    }

    /// Number of failed attempts of one class.
    pub const fn attempts_for(&self, class: RetryClass) -> u32 {
        match class {
            RetryClass::Throttled => self.throttled_attempts,
            RetryClass::Network => self.network_attempts,
        }
    }

    /// Un-jittered delay that the next retry will start from.
    pub const fn next_delay(&self) -> Duration {
        self.next_delay
    }

    /// Record a failed attempt and decide whether to retry.
    ///
    /// `retry_after` is the server's hint; the chosen delay is never shorter than it.
    pub fn on_failure(&mut self, class: RetryClass, retry_after: Option<Duration>) -> Decision {
        let (attempts, limit) = match class {
            RetryClass::Throttled => {
                self.throttled_attempts += 1;
                (self.throttled_attempts, self.policy.max_rate_limit_attempts)
            }
            RetryClass::Network => {
                self.network_attempts += 1;
                (self.network_attempts, self.policy.max_network_attempts)
            }
        };
        if attempts >= limit {
            return Decision::GiveUp;
        }

        // Jitter stays below half the base delay so consecutive delays keep increasing.
        let jitter_cap = (self.policy.base_delay.as_millis() / 2) as u64;
        let jitter = if jitter_cap == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(self.rng.gen_range(0..jitter_cap))
        };

        let mut delay = self.next_delay + jitter;
        if let Some(hint) = retry_after {
            delay = delay.max(hint);
        }
        let delay = delay.min(self.policy.max_delay);

        self.next_delay = (self.next_delay * 2).min(self.policy.max_delay);
        Decision::Retry(delay)
    }
}

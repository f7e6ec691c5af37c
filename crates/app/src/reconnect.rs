//! Reconnect policy and link status.
//!
//! The connection driver asks [`Backoff`] how long to wait before each new
//! attempt instead of sleeping a hardcoded delay; the engine mirrors the
//! outcome in [`LinkStatus`].

use std::time::Duration;

use serde::Deserialize;

/// Exponential backoff, capped, with an optional attempt limit.
///
/// A `multiplier` of `1` gives a fixed delay between attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Delay before the first retry, in seconds.
    pub initial_delay_secs: u64,
    /// Upper bound for any single delay, in seconds.
    pub max_delay_secs: u64,
    /// Growth factor applied per failed attempt.
    pub multiplier: u32,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_secs: 5,
            max_delay_secs: 60,
            multiplier: 2,
            max_attempts: None,
        }
    }
}

/// Retry state for one connection driver.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Record a failed attempt and return the delay before the next one,
    /// or `None` once the attempt limit is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_attempts
            && self.attempts >= max
        {
            return None;
        }
        let factor = u64::from(self.policy.multiplier.max(1)).saturating_pow(self.attempts);
        let secs = self
            .policy
            .initial_delay_secs
            .saturating_mul(factor)
            .min(self.policy.max_delay_secs);
        self.attempts += 1;
        Some(Duration::from_secs(secs))
    }

    /// Consecutive failed attempts since the last successful connection.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forget past failures after a successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

/// Health of the link to the cloud side, as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    /// No session established yet.
    #[default]
    Connecting,
    /// Session live, subscriptions in place, baseline published.
    Online,
    /// Session lost; the driver is retrying.
    Degraded { attempts: u32, retry_in: Duration },
    /// The driver gave up. Local control continues without reporting.
    Offline,
}

impl LinkStatus {
    /// Anything but [`Online`](Self::Online).
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Online)
    }
}

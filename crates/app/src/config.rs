//! Engine tuning.

use std::time::Duration;

use serde::Deserialize;

/// Timing and mechanics of the synchronization engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long the entry door stays open after a valid card, in seconds.
    pub dwell_secs: u64,
    /// Period of the sensor poll cycle, in milliseconds.
    pub poll_interval_ms: u64,
    /// Stepper displacement that takes the window from closed to open.
    pub window_steps: u16,
    /// Quiet period after a card read before the reader is polled again,
    /// in milliseconds.
    pub card_cooldown_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dwell_secs: 5,
            poll_interval_ms: 50,
            // Quarter turn of a 2048-step motor.
            window_steps: 512,
            card_cooldown_ms: 2000,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn dwell(&self) -> Duration {
        Duration::from_secs(self.dwell_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn card_cooldown(&self) -> Duration {
        Duration::from_millis(self.card_cooldown_ms)
    }
}

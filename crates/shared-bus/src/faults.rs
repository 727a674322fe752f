//! # Fault Injection
//!
//! Reproduces the guarantees the transport does NOT give: messages can be
//! lost, duplicated, or overtaken by messages sent after them.

use std::time::Duration;

/// Fault profile of an [`InMemoryTransport`](crate::InMemoryTransport).
///
/// Rates are probabilities in `0.0..=1.0`; out-of-range values are clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    /// Probability that a message is silently lost.
    pub drop_rate: f64,
    /// Probability that a message is delivered twice.
    pub duplicate_rate: f64,
    /// Upper bound of a random per-copy delivery delay. Non-zero values
    /// reorder messages.
    pub max_delay: Duration,
    /// Seed for the fault RNG so unreliable runs are reproducible.
    pub seed: u64,
}

impl FaultConfig {
    /// No faults: every message is delivered once, immediately.
    #[must_use]
    pub fn reliable() -> Self {
        Self {
            drop_rate: 0.0,
            duplicate_rate: 0.0,
            max_delay: Duration::ZERO,
            seed: 0,
        }
    }

    /// Duplicate and reorder messages without losing any.
    #[must_use]
    pub fn chaotic(seed: u64) -> Self {
        Self {
            drop_rate: 0.0,
            duplicate_rate: 0.3,
            max_delay: Duration::from_millis(20),
            seed,
        }
    }

    #[must_use]
    pub fn with_drop_rate(mut self, rate: f64) -> Self {
        self.drop_rate = rate.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_duplicate_rate(mut self, rate: f64) -> Self {
        self.duplicate_rate = rate.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Whether any fault can occur.
    pub fn is_reliable(&self) -> bool {
        self.drop_rate <= 0.0 && self.duplicate_rate <= 0.0 && self.max_delay.is_zero()
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::reliable()
    }
}

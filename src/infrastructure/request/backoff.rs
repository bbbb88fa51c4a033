//! Exponential backoff with random jitter.

use std::time::Duration;

use rand::Rng;

/// Delay schedule for retried requests.
///
/// Attempt `n` (1-based) waits `base * 2^(n-1)`, capped at `max`, plus up to
/// 20% random jitter so concurrent callers do not retry in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    #[must_use]
    pub const fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    #[must_use]
    pub fn from_millis(base_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms), Duration::from_millis(max_ms))
    }

    /// Delay before retry number `attempt`, without jitter.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        self.base.saturating_mul(1u32 << exponent).min(self.max)
    }

    /// Delay before retry number `attempt`, with jitter.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        base + jitter(base)
    }
}

fn jitter(base: Duration) -> Duration {
    let range_ms = u64::try_from(base.as_millis() / 5).unwrap_or(u64::MAX);
    if range_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=range_ms))
}

//! Remaining-quota tracking from response headers.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

/// Tracks the venue's advertised remaining request quota.
///
/// Once a response reports fewer than `low_water` remaining requests, the
/// next request admitted pauses for `pause` first. One pause is owed per low
/// reading.
#[derive(Debug)]
pub struct RateLimitTracker {
    low_water: u32,
    pause: Duration,
    state: Mutex<QuotaState>,
}

#[derive(Debug, Default)]
struct QuotaState {
    remaining: Option<u32>,
    pause_owed: bool,
}

impl RateLimitTracker {
    #[must_use]
    pub fn new(low_water: u32, pause: Duration) -> Self {
        Self {
            low_water,
            pause,
            state: Mutex::new(QuotaState::default()),
        }
    }

    /// Record the quota reported by a response. `None` leaves state as is.
    pub fn record(&self, remaining: Option<u32>) {
        let Some(remaining) = remaining else {
            return;
        };
        let mut state = self.state.lock();
        state.remaining = Some(remaining);
        state.pause_owed = remaining < self.low_water;
        if state.pause_owed {
            debug!(remaining, low_water = self.low_water, "Rate limit quota low");
        }
    }

    /// Take the pause owed before the next request, if any.
    pub fn take_pause(&self) -> Option<Duration> {
        let mut state = self.state.lock();
        std::mem::take(&mut state.pause_owed).then_some(self.pause)
    }

    /// Last quota reported by the venue.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.state.lock().remaining
    }
}

//! Order polling settings.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::{EventId, MarketId};

/// `[orders]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// History window ending now.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
    /// Consecutive failed refreshes before retrying stops until the next tick.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default)]
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub market_id: Option<MarketId>,
}

fn default_interval_secs() -> u64 {
    12
}

fn default_window_days() -> u32 {
    7
}

fn default_page_limit() -> u32 {
    50
}

fn default_retry_base_ms() -> u64 {
    1000
}

fn default_retry_max_ms() -> u64 {
    30_000
}

fn default_max_retry_attempts() -> u32 {
    5
}

impl OrderPollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Delay before retry number `attempt` (1-based): base doubled per
    /// attempt, capped at `retry_max_ms`.
    #[must_use]
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.retry_base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.retry_max_ms))
    }
}

impl Default for OrderPollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            window_days: default_window_days(),
            page_limit: default_page_limit(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            max_retry_attempts: default_max_retry_attempts(),
            event_id: None,
            market_id: None,
        }
    }
}

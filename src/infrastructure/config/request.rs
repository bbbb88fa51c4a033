//! Request orchestration settings.

use std::time::Duration;

use serde::Deserialize;

/// `[requests]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Requests in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Attempts per request, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Pause before the next request once remaining quota drops below this.
    #[serde(default = "default_rate_limit_low_water")]
    pub rate_limit_low_water: u32,
    #[serde(default = "default_rate_limit_pause_ms")]
    pub rate_limit_pause_ms: u64,
    /// How long before expiry the session is proactively refreshed.
    #[serde(default = "default_refresh_lead_secs")]
    pub refresh_lead_secs: u64,
}

fn default_max_concurrency() -> usize {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    8000
}

fn default_rate_limit_low_water() -> u32 {
    5
}

fn default_rate_limit_pause_ms() -> u64 {
    1000
}

fn default_refresh_lead_secs() -> u64 {
    60
}

impl RequestConfig {
    #[must_use]
    pub fn rate_limit_pause(&self) -> Duration {
        Duration::from_millis(self.rate_limit_pause_ms)
    }

    #[must_use]
    pub fn refresh_lead(&self) -> Duration {
        Duration::from_secs(self.refresh_lead_secs)
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            rate_limit_low_water: default_rate_limit_low_water(),
            rate_limit_pause_ms: default_rate_limit_pause_ms(),
            refresh_lead_secs: default_refresh_lead_secs(),
        }
    }
}

//! Catalog sync settings.

use std::time::Duration;

use serde::Deserialize;

use crate::application::hierarchy::BuildOptions;

/// `[catalog]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Seconds between full catalog syncs in `run` mode.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Pause between consecutive catalog fetches.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
    /// Only sync these tournaments. Empty means all.
    #[serde(default)]
    pub tournament_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub keep_empty_markets: bool,
    #[serde(default)]
    pub keep_empty_events: bool,
    #[serde(default)]
    pub keep_empty_tournaments: bool,
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_fetch_delay_ms() -> u64 {
    250
}

fn default_true() -> bool {
    true
}

impl CatalogConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    #[must_use]
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            keep_empty_markets: self.keep_empty_markets,
            keep_empty_events: self.keep_empty_events,
            keep_empty_tournaments: self.keep_empty_tournaments,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            fetch_delay_ms: default_fetch_delay_ms(),
            tournament_ids: Vec::new(),
            keep_empty_markets: true,
            keep_empty_events: false,
            keep_empty_tournaments: false,
        }
    }
}

//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; venue credentials come from the
//! environment (`VENUE_USERNAME`, `VENUE_PASSWORD`, `VENUE_API_KEY`).
//!
//! # Example
//!
//! ```no_run
//! use linebook::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::request::RequestConfig;
use super::venue::{VenueConfig, VenueCredentials};
use crate::application::config::{CatalogConfig, OrderPollingConfig};
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub venue: VenueConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Concurrency, retry and rate-limit behavior of venue calls.
    #[serde(default)]
    pub requests: RequestConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Wager history polling.
    #[serde(default)]
    pub orders: OrderPollingConfig,
}

impl Config {
    /// Parse configuration from TOML content and load credentials from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        // Credentials are never read from the file.
        config.venue.credentials = VenueCredentials::from_env();

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed, or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.venue.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        match Url::parse(&self.venue.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: format!("unsupported scheme {}", url.scheme()),
                }
                .into())
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: e.to_string(),
                }
                .into())
            }
        }
        if self.venue.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"json\" or \"pretty\"".to_string(),
            }
            .into());
        }

        let requests = &self.requests;
        if requests.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrency",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if requests.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if requests.backoff_max_ms < requests.backoff_base_ms {
            return Err(ConfigError::InvalidValue {
                field: "backoff_max_ms",
                reason: "must be >= backoff_base_ms".to_string(),
            }
            .into());
        }

        if self.catalog.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let orders = &self.orders;
        if orders.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if orders.window_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_days",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if orders.page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_limit",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if orders.retry_max_ms < orders.retry_base_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_ms",
                reason: "must be >= retry_base_ms".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

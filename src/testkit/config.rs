//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests, so each
//! test module does not define its own slightly-different defaults.

use crate::infrastructure::config::{CatalogConfig, OrderPollingConfig, RequestConfig};

/// Request policy with millisecond backoff.
pub fn requests(max_concurrency: usize) -> RequestConfig {
    RequestConfig {
        max_concurrency,
        backoff_base_ms: 10,
        backoff_max_ms: 40,
        ..RequestConfig::default()
    }
}

/// Catalog settings with no delay between listing calls.
pub fn catalog() -> CatalogConfig {
    CatalogConfig {
        fetch_delay_ms: 0,
        ..CatalogConfig::default()
    }
}

/// Order polling with the default 12s interval and fast retries.
pub fn orders() -> OrderPollingConfig {
    OrderPollingConfig {
        retry_base_ms: 100,
        retry_max_ms: 400,
        ..OrderPollingConfig::default()
    }
}

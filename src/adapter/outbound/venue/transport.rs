//! reqwest-backed venue transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client as HttpClient;
use tracing::trace;
use url::Url;

use crate::error::{ConfigError, Result};
use crate::infrastructure::config::VenueConfig;
use crate::port::{ApiRequest, ApiResponse, Method, Transport};

/// Response header carrying the remaining request quota.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const API_KEY_HEADER: &str = "x-api-key";

/// One HTTP exchange per [`Transport::send`], no retries.
pub struct HttpTransport {
    http: HttpClient,
    base: Url,
}

impl HttpTransport {
    /// Build from `[venue]` settings, sending the API key on every request
    /// when one is configured.
    ///
    /// # Errors
    ///
    /// Returns a config error for a bad base URL or API key, or an HTTP error
    /// if the client cannot be built.
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &VenueConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.credentials.api_key {
            let value = HeaderValue::from_str(key).map_err(|e| ConfigError::InvalidValue {
                field: "VENUE_API_KEY",
                reason: e.to_string(),
            })?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base: base_url(&config.base_url)?,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }
}

/// Parse `raw` so that relative joins keep its path.
///
/// # Errors
///
/// Returns a URL error when `raw` does not parse.
pub fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve `path` and `query` against `base`.
///
/// # Errors
///
/// Returns a URL error when the joined URL is invalid.
pub fn endpoint(base: &Url, path: &str, query: &[(String, String)]) -> Result<Url> {
    let mut url = base.join(path.trim_start_matches('/'))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        let url = endpoint(&self.base, &request.path, &request.query)?;
        trace!(method = ?request.method, url = %url, "Venue request");

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            body,
            rate_limit_remaining,
        })
    }
}

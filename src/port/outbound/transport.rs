//! Raw request/response port for the venue REST API.
//!
//! The transport performs exactly one HTTP exchange per call. Retries,
//! concurrency limits, rate-limit pauses and credential refresh all live in
//! the request orchestrator above it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One venue call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Whether the bearer token must be attached.
    pub authenticated: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            authenticated: true,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Mark the request as not needing a bearer token.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// What came back from one exchange, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `x-ratelimit-remaining` header, when sent.
    pub rate_limit_remaining: Option<u32>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            rate_limit_remaining: None,
        }
    }

    #[must_use]
    pub fn with_remaining(mut self, remaining: u32) -> Self {
        self.rate_limit_remaining = Some(remaining);
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body. An empty body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns a JSON error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Performs single HTTP exchanges with the venue.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `token` as a bearer credential when given.
    ///
    /// Non-2xx statuses are returned as responses, not errors. Errors are
    /// reserved for failures to complete the exchange at all.
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse>;
}

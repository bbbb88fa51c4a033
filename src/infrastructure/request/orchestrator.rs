//! Bounded-concurrency, retrying request execution.
//!
//! Every venue call goes through [`RequestOrchestrator::execute`]:
//!
//! ```text
//! caller ──► permit (FIFO, max N) ──► rate-limit pause? ──► transport
//!                 ▲                                             │
//!                 │      429 / 5xx / network: backoff + jitter  │
//!                 └──────── 401: single-flight refresh ◄────────┘
//! ```
//!
//! Requests are admitted in FIFO order but may complete out of order.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, warn};

use super::auth::SessionManager;
use super::backoff::Backoff;
use super::rate_limit::RateLimitTracker;
use crate::application::shutdown::sleep_or_cancel;
use crate::error::{Error, Result, VenueError};
use crate::infrastructure::config::RequestConfig;
use crate::port::{ApiRequest, ApiResponse, Transport};

const MAX_BODY_IN_ERROR: usize = 512;

/// Executes venue requests with concurrency, rate-limit and retry policy.
pub struct RequestOrchestrator {
    transport: Arc<dyn Transport>,
    sessions: Option<Arc<SessionManager>>,
    permits: Semaphore,
    max_concurrency: usize,
    rate_limit: RateLimitTracker,
    backoff: Backoff,
    max_attempts: u32,
    shutdown: watch::Receiver<bool>,
}

impl RequestOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, config: &RequestConfig) -> Self {
        // Sender dropped at once: never cancelled unless `with_shutdown` is used.
        let (_tx, shutdown) = watch::channel(false);
        let max_concurrency = config.max_concurrency.max(1);
        Self {
            transport,
            sessions: None,
            permits: Semaphore::new(max_concurrency),
            max_concurrency,
            rate_limit: RateLimitTracker::new(
                config.rate_limit_low_water,
                config.rate_limit_pause(),
            ),
            backoff: Backoff::from_millis(config.backoff_base_ms, config.backoff_max_ms),
            max_attempts: config.max_attempts.max(1),
            shutdown,
        }
    }

    /// Attach the session used for authenticated requests.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Cancel pending retries and waits once `shutdown` turns true.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    #[must_use]
    pub fn sessions(&self) -> Option<&Arc<SessionManager>> {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    /// Requests currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.max_concurrency - self.permits.available_permits()
    }

    /// Execute `request`, returning the first 2xx response.
    ///
    /// # Errors
    ///
    /// - [`Error::Venue`] for non-retryable 4xx responses (no retry)
    /// - [`Error::Auth`] when credentials cannot be obtained or refreshed
    /// - [`Error::RateLimited`], [`Error::Venue`] or [`Error::Upstream`]
    ///   once 429/5xx retries are exhausted
    /// - the last transport error once network retries are exhausted
    /// - [`Error::Cancelled`] once the shutdown signal is raised
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut shutdown = self.shutdown.clone();
        let mut token: Option<String> = None;
        let mut refreshed = false;
        let mut attempt = 0u32;

        loop {
            if *shutdown.borrow() {
                return Err(Error::Cancelled);
            }
            attempt += 1;

            let sessions = self.sessions.as_ref().filter(|_| request.authenticated);
            if let (Some(sessions), None) = (sessions, token.as_ref()) {
                token = Some(sessions.token().await?);
            }

            let outcome = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|_| Error::Cancelled)?;
                if let Some(pause) = self.rate_limit.take_pause() {
                    debug!(pause_ms = pause.as_millis() as u64, "Pausing for rate limit");
                    sleep_or_cancel(pause, &mut shutdown).await?;
                }
                self.transport.send(request, token.as_deref()).await
            };

            let failure = match outcome {
                Ok(response) => {
                    self.rate_limit.record(response.rate_limit_remaining);
                    match response.status {
                        200..=299 => return Ok(response),
                        401 => {
                            let Some(sessions) = sessions else {
                                return Err(Error::Auth(venue_error(&response).to_string()));
                            };
                            if refreshed {
                                sessions.invalidate();
                                return Err(Error::Auth(
                                    "venue rejected refreshed credentials".to_string(),
                                ));
                            }
                            refreshed = true;
                            debug!(path = %request.path, "Access token rejected, refreshing");
                            token = Some(sessions.refresh_rejected(token.as_deref()).await?);
                            // The refresh retry does not count against attempts.
                            attempt -= 1;
                            continue;
                        }
                        429 => Error::RateLimited { attempts: attempt },
                        status if status >= 500 => upstream_error(&response),
                        _ => return Err(Error::Venue(venue_error(&response))),
                    }
                }
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if attempt >= self.max_attempts {
                warn!(
                    path = %request.path,
                    attempts = attempt,
                    error = %failure,
                    "Request failed after retries"
                );
                return Err(failure);
            }

            let delay = self.backoff.delay(attempt);
            debug!(
                path = %request.path,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Retrying request"
            );
            sleep_or_cancel(delay, &mut shutdown).await?;
        }
    }

    /// Execute `request` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); decoding failures are [`Error::Json`].
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(alias = "code")]
    error: Option<String>,
    message: Option<String>,
}

/// Map an error response to a [`VenueError`], keeping the venue's code.
#[must_use]
pub fn venue_error(response: &ApiResponse) -> VenueError {
    let envelope = serde_json::from_str::<Envelope>(&response.body).ok();
    let (code, message) = match envelope {
        Some(Envelope { error, message }) if error.is_some() || message.is_some() => (
            error.unwrap_or_else(|| format!("http_{}", response.status)),
            message.unwrap_or_default(),
        ),
        _ => (format!("http_{}", response.status), truncate(&response.body)),
    };
    VenueError::new(response.status, code, message)
}

fn upstream_error(response: &ApiResponse) -> Error {
    if serde_json::from_str::<Envelope>(&response.body).is_ok_and(|e| e.error.is_some()) {
        return Error::Venue(venue_error(response));
    }
    Error::Upstream {
        status: response.status,
        body: truncate(&response.body),
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_IN_ERROR) {
        Some((end, _)) => format!("{}…", &body[..end]),
        None => body.to_string(),
    }
}

//! Resilient request execution against the venue.
//!
//! - [`orchestrator`] - bounded concurrency, retries and error mapping
//! - [`auth`] - session state, single-flight and proactive refresh
//! - [`backoff`] - exponential backoff with jitter
//! - [`rate_limit`] - remaining-quota tracking

pub mod auth;
pub mod backoff;
pub mod orchestrator;
pub mod rate_limit;

pub use auth::{AuthSession, RefreshHandle, SessionManager};
pub use backoff::Backoff;
pub use orchestrator::{venue_error, RequestOrchestrator};
pub use rate_limit::RateLimitTracker;

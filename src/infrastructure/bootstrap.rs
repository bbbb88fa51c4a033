//! Wiring of the venue stack from configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::outbound::venue::{HttpAuthenticator, HttpTransport, VenueClient};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::request::{RefreshHandle, RequestOrchestrator, SessionManager};
use crate::port::{Authenticator, Transport};

/// Retry interval for the proactive refresh task after a failure.
const REFRESH_RETRY: Duration = Duration::from_secs(30);

/// Transport, sessions, orchestrator and typed client sharing one shutdown
/// signal.
pub struct VenueStack {
    pub sessions: Option<Arc<SessionManager>>,
    pub requests: Arc<RequestOrchestrator>,
    pub client: Arc<VenueClient>,
    shutdown_tx: watch::Sender<bool>,
}

impl VenueStack {
    /// Spawn the proactive token refresh, when logged-in sessions are used.
    pub fn start_refresh(&self) -> Option<RefreshHandle> {
        self.sessions
            .as_ref()
            .map(|sessions| sessions.start_proactive_refresh(REFRESH_RETRY))
    }

    /// Abort pending retries and backoff waits in every request.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Build the venue stack. Without username and password, requests are sent
/// without a bearer token.
///
/// # Errors
///
/// Returns an error if the HTTP transport cannot be built.
#[allow(clippy::result_large_err)]
pub fn connect(config: &Config) -> Result<VenueStack> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(&config.venue)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut requests =
        RequestOrchestrator::new(Arc::clone(&transport), &config.requests).with_shutdown(shutdown_rx);

    let sessions = if config.venue.credentials.can_login() {
        let authenticator: Arc<dyn Authenticator> = Arc::new(HttpAuthenticator::new(
            Arc::clone(&transport),
            config.venue.credentials.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(
            authenticator,
            config.requests.refresh_lead(),
        ));
        requests = requests.with_sessions(Arc::clone(&sessions));
        Some(sessions)
    } else {
        warn!("VENUE_USERNAME/VENUE_PASSWORD not set, sending unauthenticated requests");
        None
    };

    let requests = Arc::new(requests);
    info!(
        base_url = %config.venue.base_url,
        max_concurrency = config.requests.max_concurrency,
        authenticated = sessions.is_some(),
        "Venue client ready"
    );

    Ok(VenueStack {
        sessions,
        client: Arc::new(VenueClient::new(Arc::clone(&requests))),
        requests,
        shutdown_tx,
    })
}

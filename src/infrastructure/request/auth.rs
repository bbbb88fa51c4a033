//! Session state and single-flight credential refresh.
//!
//! [`SessionManager`] owns the one piece of shared mutable state in the
//! request path. Refreshes are serialized by an async mutex; a caller that
//! saw a 401 with token `T` only refreshes if the session still holds `T`,
//! so a burst of concurrent 401s results in exactly one refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::port::{Authenticator, TokenGrant};

/// Current credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    #[must_use]
    pub fn from_grant(grant: TokenGrant) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_at,
        }
    }

    /// Time left until `expires_at - lead`, zero if already past.
    #[must_use]
    pub fn refresh_due_in(&self, lead: Duration, now: DateTime<Utc>) -> Duration {
        let lead = chrono::Duration::from_std(lead).unwrap_or_else(|_| chrono::Duration::zero());
        (self.expires_at - lead - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Delay before the next proactive refresh.
    ///
    /// Inside the lead window (a grant shorter than `lead`) this is half the
    /// remaining lifetime, never less than `floor`.
    #[must_use]
    pub fn next_refresh_in(&self, lead: Duration, floor: Duration, now: DateTime<Utc>) -> Duration {
        let due = self.refresh_due_in(lead, now);
        if !due.is_zero() {
            return due;
        }
        let remaining = (self.expires_at - now).to_std().unwrap_or(Duration::ZERO);
        (remaining / 2).max(floor)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Holds the [`AuthSession`] and serializes every login and refresh.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    session: RwLock<Option<AuthSession>>,
    refresh_guard: Mutex<()>,
    refreshes: AtomicU64,
    lead: Duration,
}

impl SessionManager {
    /// `lead` is how long before expiry the proactive task refreshes.
    pub fn new(authenticator: Arc<dyn Authenticator>, lead: Duration) -> Self {
        Self {
            authenticator,
            session: RwLock::new(None),
            refresh_guard: Mutex::new(()),
            refreshes: AtomicU64::new(0),
            lead,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    fn current_token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.access_token.clone())
    }

    /// Number of completed refresh/login exchanges.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// A usable access token, logging in first if there is no session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when login fails.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.current_token() {
            return Ok(token);
        }
        let _guard = self.refresh_guard.lock().await;
        // Another caller may have logged in while we waited.
        if let Some(token) = self.current_token() {
            return Ok(token);
        }
        self.renew().await
    }

    /// Refresh after the venue rejected `rejected`.
    ///
    /// If the session already holds a different token, that token is
    /// returned without another refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the refresh fails; the session is
    /// invalidated.
    pub async fn refresh_rejected(&self, rejected: Option<&str>) -> Result<String> {
        let _guard = self.refresh_guard.lock().await;
        if let Some(current) = self.current_token() {
            if rejected != Some(current.as_str()) {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.renew().await
    }

    /// Refresh unconditionally.
    ///
    /// # Errors
    ///
    /// See [`refresh_rejected`](Self::refresh_rejected).
    pub async fn refresh(&self) -> Result<String> {
        let _guard = self.refresh_guard.lock().await;
        self.renew().await
    }

    /// Drop the session. The next request logs in again.
    pub fn invalidate(&self) {
        *self.session.write() = None;
    }

    /// Must be called with `refresh_guard` held.
    async fn renew(&self) -> Result<String> {
        let refresh_token = self.session().and_then(|s| s.refresh_token);

        let grant = match refresh_token {
            Some(ref token) => match self.authenticator.refresh(token).await {
                Ok(grant) => Ok(grant),
                Err(e) => {
                    warn!(error = %e, "Token refresh rejected, logging in again");
                    self.authenticator.login().await
                }
            },
            None => self.authenticator.login().await,
        };
        self.refreshes.fetch_add(1, Ordering::SeqCst);

        match grant {
            Ok(grant) => {
                let session = AuthSession::from_grant(grant);
                let token = session.access_token.clone();
                info!(expires_at = %session.expires_at, "Session renewed");
                *self.session.write() = Some(session);
                Ok(token)
            }
            Err(e) => {
                self.invalidate();
                Err(match e {
                    Error::Auth(_) => e,
                    other => Error::Auth(other.to_string()),
                })
            }
        }
    }

    /// Spawn a task that refreshes `lead` before each expiry.
    ///
    /// Without a session the task waits `retry` and checks again; a failed
    /// refresh is logged and retried after `retry` as well. Grants shorter
    /// than the lead are refreshed at half their lifetime, at most once per
    /// `retry`. Reactive 401 refresh remains the fallback.
    pub fn start_proactive_refresh(self: &Arc<Self>, retry: Duration) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                let wait = manager
                    .session()
                    .map_or(retry, |s| s.next_refresh_in(manager.lead, retry, Utc::now()));

                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        debug!("Proactive refresh stopping");
                        break;
                    }
                    () = tokio::time::sleep(wait) => {
                        if manager.session().is_none() {
                            continue;
                        }
                        if let Err(e) = manager.refresh().await {
                            warn!(error = %e, "Proactive refresh failed");
                            tokio::select! {
                                _ = shutdown_rx.changed() => break,
                                () = tokio::time::sleep(retry) => {}
                            }
                        }
                    }
                }
            }
        });

        RefreshHandle { shutdown_tx, task }
    }
}

/// Stops the proactive refresh task.
pub struct RefreshHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Signal the task to stop and wait for it.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::auth::ScriptedAuthenticator;

    fn manager(auth: &Arc<ScriptedAuthenticator>) -> Arc<SessionManager> {
        let auth: Arc<dyn Authenticator> = auth.clone();
        Arc::new(SessionManager::new(auth, Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn test_token_logs_in_once() {
        let auth = Arc::new(ScriptedAuthenticator::new());
        let sessions = manager(&auth);

        let first = sessions.token().await.unwrap();
        let second = sessions.token().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(auth.login_count(), 1);
        assert_eq!(sessions.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rejected_skips_when_token_already_changed() {
        let auth = Arc::new(ScriptedAuthenticator::new());
        let sessions = manager(&auth);
        let stale = sessions.token().await.unwrap();

        let fresh = sessions.refresh_rejected(Some(&stale)).await.unwrap();
        assert_ne!(fresh, stale);
        assert_eq!(auth.refresh_count(), 1);

        // A second caller that also saw the stale token gets the fresh one.
        let again = sessions.refresh_rejected(Some(&stale)).await.unwrap();
        assert_eq!(again, fresh);
        assert_eq!(auth.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_invalidates_session() {
        let auth = Arc::new(ScriptedAuthenticator::new());
        let sessions = manager(&auth);
        let token = sessions.token().await.unwrap();

        auth.fail_refresh(true);
        auth.fail_login(true);
        let err = sessions.refresh_rejected(Some(&token)).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(sessions.session().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_proactive_refresh_fires_before_expiry() {
        let auth = Arc::new(ScriptedAuthenticator::new().with_lifetime(Duration::from_secs(120)));
        let sessions = manager(&auth);
        sessions.token().await.unwrap();

        let handle = sessions.start_proactive_refresh(Duration::from_secs(5));
        // Due at expiry (120s) minus lead (60s).
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(auth.refresh_count(), 1);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(auth.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_lived_grant_does_not_spin() {
        // Lifetime below the 60s lead: every grant is already due.
        let auth = Arc::new(ScriptedAuthenticator::new().with_lifetime(Duration::from_secs(30)));
        let sessions = manager(&auth);
        sessions.token().await.unwrap();

        let handle = sessions.start_proactive_refresh(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(auth.refresh_count(), 0);

        // Half of the 30s lifetime between refreshes.
        tokio::time::sleep(Duration::from_secs(100)).await;
        let refreshes = auth.refresh_count();
        assert!((5..=7).contains(&refreshes), "{refreshes} refreshes in 100s");

        handle.shutdown().await;
    }

    #[test]
    fn test_next_refresh_in_is_floored_inside_lead_window() {
        let now = Utc::now();
        let lead = Duration::from_secs(60);
        let floor = Duration::from_secs(5);
        let session = |secs| AuthSession {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: now + chrono::Duration::seconds(secs),
        };

        assert_eq!(session(120).next_refresh_in(lead, floor, now), Duration::from_secs(60));
        assert_eq!(session(30).next_refresh_in(lead, floor, now), Duration::from_secs(15));
        assert_eq!(session(4).next_refresh_in(lead, floor, now), floor);
        assert_eq!(session(-10).next_refresh_in(lead, floor, now), floor);
    }

    #[test]
    fn test_refresh_due_in_saturates() {
        let now = Utc::now();
        let session = AuthSession {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: now + chrono::Duration::seconds(30),
        };
        assert_eq!(session.refresh_due_in(Duration::from_secs(60), now), Duration::ZERO);
        assert_eq!(
            session.refresh_due_in(Duration::from_secs(10), now),
            Duration::from_secs(20)
        );
        assert!(!session.is_expired(now));
    }
}

//! [`Authenticator`] that issues numbered tokens.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::port::{Authenticator, TokenGrant};

/// Issues `token-1`, `token-2`, ... with matching refresh tokens.
pub struct ScriptedAuthenticator {
    issued: AtomicU32,
    logins: AtomicU32,
    refreshes: AtomicU32,
    fail_login: AtomicBool,
    fail_refresh: AtomicBool,
    lifetime: Duration,
    delay: Duration,
}

impl ScriptedAuthenticator {
    pub fn new() -> Self {
        Self {
            issued: AtomicU32::new(0),
            logins: AtomicU32::new(0),
            refreshes: AtomicU32::new(0),
            fail_login: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            lifetime: Duration::from_secs(3600),
            delay: Duration::ZERO,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Hold each exchange for `delay`, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_login(&self, fail: bool) {
        self.fail_login.store(fail, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub fn login_count(&self) -> u32 {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    async fn issue(&self, fail: &AtomicBool, what: &str) -> Result<TokenGrant> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if fail.load(Ordering::SeqCst) {
            return Err(Error::Auth(format!("scripted {what} failure")));
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let lifetime = chrono::Duration::from_std(self.lifetime).unwrap();
        Ok(TokenGrant {
            access_token: format!("token-{n}"),
            refresh_token: Some(format!("refresh-{n}")),
            expires_at: Utc::now() + lifetime,
        })
    }
}

impl Default for ScriptedAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn login(&self) -> Result<TokenGrant> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        self.issue(&self.fail_login, "login").await
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.issue(&self.fail_refresh, "refresh").await
    }
}

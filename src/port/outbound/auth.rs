//! Credential acquisition port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Credentials issued by the venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Obtains and renews access tokens.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate from configured credentials.
    async fn login(&self) -> Result<TokenGrant>;

    /// Exchange a refresh token for a new grant.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;
}

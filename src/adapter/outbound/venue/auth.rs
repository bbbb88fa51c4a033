//! Username/password login and refresh-token exchange.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::dto::{LoginRequest, RefreshRequest, TokenResponse};
use crate::error::{Error, Result};
use crate::infrastructure::config::VenueCredentials;
use crate::infrastructure::request::venue_error;
use crate::port::{ApiRequest, ApiResponse, Authenticator, TokenGrant, Transport};

const LOGIN_PATH: &str = "/auth/login";
const REFRESH_PATH: &str = "/auth/refresh";

/// Talks to the venue's auth endpoints directly over the transport.
///
/// These calls bypass the request orchestrator: they are the thing the
/// orchestrator calls when a token is missing or rejected.
pub struct HttpAuthenticator {
    transport: Arc<dyn Transport>,
    credentials: VenueCredentials,
}

impl HttpAuthenticator {
    pub fn new(transport: Arc<dyn Transport>, credentials: VenueCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    fn grant(response: &ApiResponse) -> Result<TokenGrant> {
        if !response.is_success() {
            return Err(Error::Auth(venue_error(response).to_string()));
        }
        let token: TokenResponse = response
            .json()
            .map_err(|e| Error::Auth(format!("malformed token response: {e}")))?;
        Ok(token.into_grant(Utc::now()))
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn login(&self) -> Result<TokenGrant> {
        let (Some(username), Some(password)) =
            (&self.credentials.username, &self.credentials.password)
        else {
            return Err(Error::Auth(
                "VENUE_USERNAME and VENUE_PASSWORD must be set to log in".to_string(),
            ));
        };
        debug!(username = %username, "Logging in");

        let body = serde_json::to_value(LoginRequest { username, password })?;
        let response = self
            .transport
            .send(&ApiRequest::post(LOGIN_PATH, body).anonymous(), None)
            .await?;
        Self::grant(&response)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        let body = serde_json::to_value(RefreshRequest { refresh_token })?;
        let response = self
            .transport
            .send(&ApiRequest::post(REFRESH_PATH, body).anonymous(), None)
            .await?;
        Self::grant(&response)
    }
}

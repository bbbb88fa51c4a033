//! Venue wire shapes that are not domain types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::port::TokenGrant;

/// Token lifetime assumed when the venue reports none.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Login/refresh response. Expiry comes as either `expires_in` seconds or an
/// absolute `expires_at`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "token", alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<i64>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenResponse {
    /// `now` anchors a relative `expires_in`.
    #[must_use]
    pub fn into_grant(self, now: DateTime<Utc>) -> TokenGrant {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
        });
        TokenGrant {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// A listing returned either bare or wrapped under a collection key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(
            alias = "items",
            alias = "results",
            alias = "tournaments",
            alias = "events",
            alias = "markets"
        )]
        data: Vec<Value>,
    },
}

impl Listing {
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// The odds ladder, bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LadderResponse {
    Bare(Vec<f64>),
    Wrapped {
        #[serde(alias = "ladder", alias = "ticks", alias = "odds")]
        data: Vec<f64>,
    },
}

impl LadderResponse {
    #[must_use]
    pub fn into_ticks(self) -> Vec<f64> {
        match self {
            Self::Bare(ticks) | Self::Wrapped { data: ticks } => ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_shapes() {
        let bare: Listing = serde_json::from_value(json!([{ "id": 1 }])).unwrap();
        assert_eq!(bare.into_items().len(), 1);

        let wrapped: Listing =
            serde_json::from_value(json!({ "events": [{ "id": 1 }, { "id": 2 }] })).unwrap();
        assert_eq!(wrapped.into_items().len(), 2);
    }

    #[test]
    fn test_token_expiry_forms() {
        let now = Utc::now();
        let relative: TokenResponse =
            serde_json::from_value(json!({ "access_token": "a", "expires_in": 120 })).unwrap();
        assert_eq!(relative.into_grant(now).expires_at, now + Duration::seconds(120));

        let absolute: TokenResponse = serde_json::from_value(json!({
            "accessToken": "a",
            "refreshToken": "r",
            "expires_at": "2030-01-01T00:00:00Z",
        }))
        .unwrap();
        let grant = absolute.into_grant(now);
        assert_eq!(grant.refresh_token.as_deref(), Some("r"));
        assert_eq!(grant.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_ladder_shapes() {
        let wrapped: LadderResponse = serde_json::from_value(json!({ "ladder": [1.5, 2.0] })).unwrap();
        assert_eq!(wrapped.into_ticks(), vec![1.5, 2.0]);
    }
}

//! Venue connection settings.

use serde::Deserialize;

/// `[venue]` section. Credentials never come from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(skip)]
    pub credentials: VenueCredentials,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("linebook/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            credentials: VenueCredentials::default(),
        }
    }
}

/// Login credentials, read from `VENUE_USERNAME`, `VENUE_PASSWORD` and
/// `VENUE_API_KEY`.
#[derive(Clone, Default)]
pub struct VenueCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

impl VenueCredentials {
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            username: var("VENUE_USERNAME"),
            password: var("VENUE_PASSWORD"),
            api_key: var("VENUE_API_KEY"),
        }
    }

    /// True when a username/password login is possible.
    #[must_use]
    pub fn can_login(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl std::fmt::Debug for VenueCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("VenueCredentials")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

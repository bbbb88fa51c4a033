use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Error reported by the venue through its `{ error, message }` envelope.
///
/// The venue's code is kept verbatim; `hint` is a static, human-readable
/// explanation for codes we recognise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("venue error {code} (HTTP {status}): {message}")]
pub struct VenueError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub hint: Option<&'static str>,
}

impl VenueError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let hint = hint_for(&code);
        Self {
            status,
            code,
            message: message.into(),
            hint,
        }
    }
}

/// Static hint for a known venue error code.
#[must_use]
pub fn hint_for(code: &str) -> Option<&'static str> {
    let hint = match code.to_ascii_lowercase().as_str() {
        "line_stale" | "stale_line" | "line_unavailable" | "odds_changed" => {
            "The line moved or closed; refresh the catalog and try again."
        }
        "insufficient_funds" | "insufficient_balance" => {
            "Your balance does not cover this stake."
        }
        "batch_size_exceeded" | "too_many_wagers" => {
            "Too many wagers in one request; split the batch."
        }
        "invalid_stake" | "stake_too_low" | "stake_too_high" => {
            "Stake must be between 0.01 and 100,000,000."
        }
        "token_expired" | "invalid_token" | "unauthorized" => {
            "Your session expired; sign in again."
        }
        "rate_limited" | "too_many_requests" => "Too many requests; slow down and retry shortly.",
        "duplicate_external_id" => "A wager with this external id was already submitted.",
        _ => return None,
    };
    Some(hint)
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited by venue after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// Whether a retry of the same request could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Connection(_) | Self::RateLimited { .. } => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

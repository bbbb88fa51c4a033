//! Wager placement and cancellation payloads.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{LineId, WagerId};
use super::odds::PriceLadder;

/// Smallest stake the venue accepts.
pub const MIN_STAKE: Decimal = dec!(0.01);
/// Largest stake the venue accepts.
pub const MAX_STAKE: Decimal = dec!(100000000);
/// Maximum length of a caller-generated idempotency key.
pub const MAX_EXTERNAL_ID_LEN: usize = 100;

/// Execution strategy requested for a wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WagerStrategy {
    #[serde(rename = "fillOrKill")]
    FillOrKill,
}

/// Validate an idempotency key: `[A-Za-z0-9_-]{1,100}`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidExternalId`] describing the first violation.
pub fn validate_external_id(external_id: &str) -> Result<(), DomainError> {
    let reject = |reason| DomainError::InvalidExternalId {
        external_id: external_id.to_string(),
        reason,
    };
    if external_id.is_empty() {
        return Err(reject("must not be empty"));
    }
    if external_id.len() > MAX_EXTERNAL_ID_LEN {
        return Err(reject("must be at most 100 characters"));
    }
    if !external_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(reject("only letters, digits, '_' and '-' are allowed"));
    }
    Ok(())
}

/// Generate a fresh idempotency key.
#[must_use]
pub fn generate_external_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A validated wager ready to be sent to the venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WagerRequest {
    pub line_id: LineId,
    pub odds: f64,
    #[serde(with = "rust_decimal::serde::float")]
    pub stake: Decimal,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_strategy: Option<WagerStrategy>,
}

impl WagerRequest {
    /// Validate inputs and snap `odds` onto `ladder`.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] for a blank line id, odds that are not a
    /// valid decimal price, a stake outside `MIN_STAKE..=MAX_STAKE` or a
    /// malformed external id.
    pub fn new(
        line_id: LineId,
        odds: f64,
        stake: Decimal,
        external_id: impl Into<String>,
        wager_strategy: Option<WagerStrategy>,
        ladder: &PriceLadder,
    ) -> Result<Self, DomainError> {
        if line_id.as_str().trim().is_empty() {
            return Err(DomainError::MissingSettlementId);
        }
        if !odds.is_finite() || odds <= 1.0 {
            return Err(DomainError::invalid_odds(odds, "decimal odds must exceed 1.0"));
        }
        if stake < MIN_STAKE || stake > MAX_STAKE {
            return Err(DomainError::InvalidStake {
                stake,
                min: MIN_STAKE,
                max: MAX_STAKE,
            });
        }
        let external_id = external_id.into();
        validate_external_id(&external_id)?;

        Ok(Self {
            line_id,
            odds: ladder.snap(odds),
            stake,
            external_id,
            wager_strategy,
        })
    }
}

/// Cancellation by venue wager id, external id, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager_id: Option<WagerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl CancelRequest {
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCancellation`] when neither id is given.
    pub fn new(wager_id: Option<WagerId>, external_id: Option<String>) -> Result<Self, DomainError> {
        if wager_id.is_none() && external_id.is_none() {
            return Err(DomainError::EmptyCancellation);
        }
        if let Some(ref external_id) = external_id {
            validate_external_id(external_id)?;
        }
        Ok(Self {
            wager_id,
            external_id,
        })
    }
}

/// Venue acknowledgement for a placed or cancelled wager.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WagerAck {
    #[serde(alias = "id")]
    pub wager_id: WagerId,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

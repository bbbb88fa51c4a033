//! Domain validation errors.
//!
//! These errors are returned when a value handed to the domain layer breaks
//! one of its rules: malformed odds, an out-of-range stake, a wager without a
//! settlement id. They are fatal to the single operation and never retried.
//!
//! # Examples
//!
//! ```
//! use linebook::domain::error::DomainError;
//! use linebook::domain::odds;
//!
//! let result = odds::to_alt(0.0);
//! assert!(matches!(result, Err(DomainError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Odds value cannot be converted or submitted.
    #[error("invalid odds '{value}': {reason}")]
    InvalidOdds {
        /// The rejected input, as text.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Stake outside the venue's accepted range.
    #[error("stake {stake} must be between {min} and {max}")]
    InvalidStake {
        stake: Decimal,
        min: Decimal,
        max: Decimal,
    },

    /// Idempotency key is empty, too long or uses forbidden characters.
    #[error("invalid external id '{external_id}': {reason}")]
    InvalidExternalId {
        external_id: String,
        reason: &'static str,
    },

    /// The selection has no settlement id and cannot be wagered on.
    #[error("selection has no settlement line id")]
    MissingSettlementId,

    /// A cancellation must name the wager somehow.
    #[error("cancellation requires a wager id or an external id")]
    EmptyCancellation,
}

impl DomainError {
    pub(crate) fn invalid_odds(value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidOdds {
            value: value.to_string(),
            reason,
        }
    }
}

//! Odds conversion between signed (moneyline) and decimal prices.
//!
//! The venue accepts wagers in decimal ("alt") format only, priced on a
//! discrete ladder. Catalog feeds and humans frequently speak in signed
//! format (`+150`, `-200`). The functions here convert exactly between the
//! two and snap decimal prices onto the venue ladder.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::DomainError;

/// Convert a signed (moneyline) price to decimal.
///
/// `+150` becomes `2.5`, `-200` becomes `1.5`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] for zero or non-finite input.
pub fn to_alt(primary: f64) -> Result<f64, DomainError> {
    if !primary.is_finite() {
        return Err(DomainError::invalid_odds(primary, "must be finite"));
    }
    if primary == 0.0 {
        return Err(DomainError::invalid_odds(primary, "must be non-zero"));
    }

    if primary > 0.0 {
        Ok(1.0 + primary / 100.0)
    } else {
        Ok(1.0 + 100.0 / primary.abs())
    }
}

/// Convert a decimal price to signed (moneyline) format.
///
/// Prices of `2.0` and above map to positive values, prices between `1.0`
/// and `2.0` to negative ones.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] when `alt <= 1.0` or is non-finite.
pub fn to_primary(alt: f64) -> Result<i64, DomainError> {
    if !alt.is_finite() {
        return Err(DomainError::invalid_odds(alt, "must be finite"));
    }
    if alt <= 1.0 {
        return Err(DomainError::invalid_odds(alt, "decimal odds must exceed 1.0"));
    }

    let signed = if alt >= 2.0 {
        ((alt - 1.0) * 100.0).round()
    } else {
        (-100.0 / (alt - 1.0)).round()
    };
    Ok(signed as i64)
}

/// A parsed signed price that remembers whether the sign was written out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedOdds {
    pub value: f64,
    /// `Some('+')` / `Some('-')` when the input carried an explicit sign.
    pub explicit_sign: Option<char>,
}

impl SignedOdds {
    /// Decimal equivalent of this signed price.
    ///
    /// # Errors
    ///
    /// See [`to_alt`].
    pub fn to_alt(self) -> Result<f64, DomainError> {
        to_alt(self.value)
    }
}

impl fmt::Display for SignedOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.explicit_sign {
            Some('+') => write!(f, "+{}", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

/// Parse a signed price such as `"+150"`, `"-110"` or `"200"`.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] on empty or non-numeric content.
pub fn parse_signed(input: &str) -> Result<SignedOdds, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_odds(input, "empty"));
    }

    let explicit_sign = trimmed.chars().next().filter(|c| *c == '+' || *c == '-');
    let digits = match explicit_sign {
        Some(_) => &trimmed[1..],
        None => trimmed,
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(DomainError::invalid_odds(input, "not a number"));
    }

    let magnitude: f64 = digits
        .parse()
        .map_err(|_| DomainError::invalid_odds(input, "not a number"))?;
    if !magnitude.is_finite() {
        return Err(DomainError::invalid_odds(input, "must be finite"));
    }

    let value = if explicit_sign == Some('-') {
        -magnitude
    } else {
        magnitude
    };
    Ok(SignedOdds {
        value,
        explicit_sign,
    })
}

/// Snap a decimal price to the closest tick of an ascending ladder.
///
/// Ties go to the first tick met in a left-to-right scan, i.e. the smaller
/// price. An empty ladder leaves the value untouched.
#[must_use]
pub fn snap_to_ladder(value: f64, ladder: &[f64]) -> f64 {
    let Some((&first, rest)) = ladder.split_first() else {
        warn!(value, "Odds ladder is empty, submitting unsnapped price");
        return value;
    };

    let mut best = first;
    let mut best_distance = (value - first).abs();
    for &tick in rest {
        let distance = (value - tick).abs();
        if distance < best_distance {
            best = tick;
            best_distance = distance;
        }
    }
    best
}

/// Venue-provided set of allowed decimal prices, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceLadder {
    ticks: Vec<f64>,
}

impl PriceLadder {
    /// Build a ladder, discarding ticks that are not valid decimal prices.
    #[must_use]
    pub fn new(mut ticks: Vec<f64>) -> Self {
        ticks.retain(|t| t.is_finite() && *t > 1.0);
        ticks.sort_by(f64::total_cmp);
        ticks.dedup();
        Self { ticks }
    }

    #[must_use]
    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Snap `value` onto this ladder. See [`snap_to_ladder`].
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        snap_to_ladder(value, &self.ticks)
    }
}

impl From<Vec<f64>> for PriceLadder {
    fn from(ticks: Vec<f64>) -> Self {
        Self::new(ticks)
    }
}

impl From<PriceLadder> for Vec<f64> {
    fn from(ladder: PriceLadder) -> Self {
        ladder.ticks
    }
}

/// Render a decimal price in signed display form (`+150`, `-200`).
///
/// # Errors
///
/// See [`to_primary`].
pub fn format_display(alt: f64) -> Result<String, DomainError> {
    let signed = to_primary(alt)?;
    if signed > 0 {
        Ok(format!("+{signed}"))
    } else {
        Ok(signed.to_string())
    }
}

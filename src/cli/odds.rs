//! Handler for the `odds` command.

use std::sync::Arc;

use crate::cli::{output, OddsArgs};
use crate::domain::odds::{format_display, parse_signed};
use crate::domain::error::DomainError;
use crate::domain::PriceLadder;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::Config;
use crate::port::WagerApi;

/// Decimal values at or above this are read as unsigned moneyline prices.
const SIGNED_THRESHOLD: f64 = 100.0;

/// One price in both formats.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub decimal: f64,
    pub display: String,
}

/// Interpret `input` as a signed price when it carries a sign or is at least
/// 100, otherwise as a decimal price.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] for unparseable or out-of-range input.
pub fn convert(input: &str) -> std::result::Result<Conversion, DomainError> {
    let trimmed = input.trim();
    let signed = trimmed.starts_with(['+', '-'])
        || trimmed
            .parse::<f64>()
            .is_ok_and(|v| v >= SIGNED_THRESHOLD);

    let decimal = if signed {
        parse_signed(trimmed)?.to_alt()?
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_| DomainError::invalid_odds(input, "not a number"))?
    };
    Ok(Conversion {
        decimal,
        display: format_display(decimal)?,
    })
}

/// Print the conversion, snapping to the venue ladder when asked.
pub async fn execute(args: &OddsArgs) -> Result<()> {
    let conversion = convert(&args.value)?;
    output::price("Input", conversion.decimal, &conversion.display);

    if args.snap {
        let config = Config::load(&args.config)?;
        config.init_logging();
        let stack = bootstrap::connect(&config)?;
        let api: Arc<dyn WagerApi> = stack.client.clone();
        let ladder: PriceLadder = api.odds_ladder().await?;
        if ladder.is_empty() {
            output::warn("Venue returned an empty ladder");
        }
        let snapped = ladder.snap(conversion.decimal);
        output::price("Snapped", snapped, &format_display(snapped)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_inputs() {
        assert_eq!(convert("+150").unwrap().decimal, 2.5);
        assert_eq!(convert("-200").unwrap().decimal, 1.5);
        assert_eq!(convert("150").unwrap().decimal, 2.5);
        assert_eq!(convert("-110").unwrap().display, "-110");
    }

    #[test]
    fn test_decimal_inputs() {
        let conversion = convert("2.5").unwrap();
        assert_eq!(conversion.decimal, 2.5);
        assert_eq!(conversion.display, "+150");
        assert_eq!(convert("1.5").unwrap().display, "-200");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(convert("abc").is_err());
        assert!(convert("1.0").is_err());
        assert!(convert("+0").is_err());
        assert!(convert("").is_err());
    }
}

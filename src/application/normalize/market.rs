//! Entry points: normalize one market's raw payloads.

use serde_json::Value;

use crate::domain::selection::{MarketClass, SelectionGroup};

use super::{group, lines, merge, shape, NormalizeError};

const SELECTION_KEYS: &[&str] = &["selections", "outcomes", "runners"];
const LINES_KEYS: &[&str] = &["lines", "alt_lines", "alternateLines"];

/// A market's selections after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMarket {
    pub class: MarketClass,
    pub groups: Vec<SelectionGroup>,
}

impl NormalizedMarket {
    #[must_use]
    pub fn empty(class: MarketClass) -> Self {
        Self {
            class,
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.groups.iter().map(|g| g.selections.len()).sum()
    }
}

/// Normalize the primary and secondary payloads of one raw market object.
///
/// # Errors
///
/// Returns [`NormalizeError`] when either payload is malformed. Callers
/// isolate the failure to this market.
pub fn normalize_market(market: &Value) -> Result<NormalizedMarket, NormalizeError> {
    let primary = first_present(market, SELECTION_KEYS).unwrap_or(&Value::Null);
    let secondary = first_present(market, LINES_KEYS);
    normalize_payloads(market, primary, secondary)
}

/// Normalize explicit payloads. `market` supplies the type/name used for
/// classification.
///
/// # Errors
///
/// See [`normalize_market`].
pub fn normalize_payloads(
    market: &Value,
    selections: &Value,
    lines: Option<&Value>,
) -> Result<NormalizedMarket, NormalizeError> {
    let mut groups = group::build_groups(shape::detect(selections)?)?;
    if let Some(lines) = lines {
        groups.extend(lines::normalize_lines(lines)?);
    }

    let class = merge::classify(market, &groups);
    Ok(NormalizedMarket {
        class,
        groups: merge::merge_groups(class, groups),
    })
}

fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value.get(key).filter(|v| !v.is_null()))
}

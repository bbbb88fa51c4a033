//! Selections, betting lines and canonical line keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::{EventId, LineId, MarketId, SelectionId};

/// A betting line as it appears in the catalog.
///
/// Most lines are numeric (`-1.5`, `215.5`); a few feeds key groups by a
/// label instead, which is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineValue {
    Number(f64),
    Label(String),
}

impl LineValue {
    /// Parse a textual line, preferring a number when the text is numeric.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Self::Number(n)),
            _ => Some(Self::Label(trimmed.to_string())),
        }
    }

    /// Read a line from a JSON scalar. Objects, arrays and nulls have no line.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Self::Number),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Label(_) => None,
        }
    }

    /// True for a numeric zero, which non-line markets often send as filler.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Number(n) if *n == 0.0)
    }
}

impl fmt::Display for LineValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0.0 would otherwise print as "-0"
            Self::Number(n) if *n == 0.0 => write!(f, "0"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(s) => write!(f, "{s}"),
        }
    }
}

/// Whether a market's selections are split by a line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketClass {
    /// Spreads, totals, handicaps: the line is part of the outcome.
    LineBearing,
    /// Moneyline-style markets: any line value is noise.
    NonLine,
}

/// Normalized string used to group selections sharing one line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineKey(String);

impl LineKey {
    /// Bucket for non-line markets and selections without a line.
    pub const DEFAULT: &'static str = "default";

    #[must_use]
    pub fn default_bucket() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Canonical key for `line` under the given market classification.
    #[must_use]
    pub fn canonical(class: MarketClass, line: Option<&LineValue>) -> Self {
        match (class, line) {
            (MarketClass::NonLine, _) | (MarketClass::LineBearing, None) => Self::default_bucket(),
            (MarketClass::LineBearing, Some(line)) => Self(line.to_string()),
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Selections that share one betting line, as produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionGroup {
    pub line: Option<LineValue>,
    pub selections: Vec<Value>,
}

impl SelectionGroup {
    #[must_use]
    pub fn new(line: Option<LineValue>, selections: Vec<Value>) -> Self {
        Self { line, selections }
    }
}

/// A wager-eligible selection in indexed form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRecord {
    pub external_id: LineId,
    pub internal_id: SelectionId,
    pub name: String,
    pub display_name: String,
    pub odds: Option<f64>,
    pub stake: Option<f64>,
    pub line: Option<LineValue>,
    pub event_id: EventId,
    pub event_name: String,
    pub market_id: MarketId,
    pub market_name: String,
    pub line_key: LineKey,
    pub raw: Value,
}

impl SelectionRecord {
    /// Human-readable `market · selection` label.
    #[must_use]
    pub fn label(&self) -> String {
        let selection = if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        };
        if self.market_name.is_empty() {
            selection.clone()
        } else {
            format!("{} · {}", self.market_name, selection)
        }
    }
}

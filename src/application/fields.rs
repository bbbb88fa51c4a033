//! Tolerant field access over raw catalog JSON.
//!
//! Catalog payloads name the same attribute several ways (`line_id` vs
//! `lineId`, `name` vs `title`). Each accessor takes the aliases it accepts in
//! priority order and returns the first usable value.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::selection::LineValue;
use crate::domain::LineId;

pub const ID_KEYS: &[&str] = &["id"];
pub const NAME_KEYS: &[&str] = &["name", "title", "display_name", "displayName", "label"];
pub const DISPLAY_NAME_KEYS: &[&str] = &["display_name", "displayName", "label", "name"];
pub const LINE_KEYS: &[&str] = &["line", "points", "handicap", "line_value", "lineValue", "spread", "total"];
pub const EXTERNAL_ID_KEYS: &[&str] = &["line_id", "lineId", "external_id", "externalId", "settlement_id"];
pub const ODDS_KEYS: &[&str] = &["odds", "decimal_odds", "decimalOdds", "price"];
pub const SIGNED_ODDS_KEYS: &[&str] = &["american_odds", "americanOdds", "moneyline"];
pub const STAKE_KEYS: &[&str] = &["stake", "volume", "liquidity", "available"];
pub const STATUS_KEYS: &[&str] = &["status", "state"];
pub const START_KEYS: &[&str] = &["starts_at", "start_time", "startTime", "scheduled", "start"];
pub const CATEGORY_KEYS: &[&str] = &["category", "category_name", "categoryName", "group"];
pub const MARKET_TYPE_KEYS: &[&str] = &["market_type", "marketType", "type", "kind"];

/// First non-empty string (or number rendered as text) under `keys`.
pub fn text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First finite number (or numeric string) under `keys`.
pub fn number(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match record.get(key)? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

/// Line declared by a record, if any.
pub fn line(record: &Value) -> Option<LineValue> {
    LINE_KEYS
        .iter()
        .find_map(|key| record.get(key).and_then(LineValue::from_json))
}

/// Settlement line id declared by a record, if any.
pub fn external_id(record: &Value) -> Option<LineId> {
    text(record, EXTERNAL_ID_KEYS).and_then(|raw| LineId::parse(&raw))
}

/// First parseable timestamp under `keys` (RFC 3339 or unix seconds).
pub fn timestamp(record: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| match record.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    })
}

/// Short type name for log messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

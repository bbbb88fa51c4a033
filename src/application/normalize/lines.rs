//! Normalization of the secondary `lines` payload.
//!
//! Some feeds publish spreads and totals in a looser structure next to
//! `selections`: a list (or line-keyed map) of line entries, each holding its
//! selections under a collection key or under side names.
//!
//! ```json
//! { "lines": [
//!     { "line": -3.5, "home": { "line_id": "H1", "odds": 1.91 },
//!                     "away": { "line_id": "A1", "odds": 1.91 } },
//!     { "points": 47.5, "outcomes": [{ "line_id": "O1" }, { "line_id": "U1" }] }
//! ] }
//! ```

use serde_json::Value;

use super::group::collect_records;
use super::NormalizeError;
use crate::application::fields;
use crate::domain::selection::{LineValue, SelectionGroup};

const COLLECTION_KEYS: &[&str] = &["selections", "outcomes", "prices", "runners"];
const SIDE_KEYS: &[&str] = &["home", "away", "draw", "over", "under"];

/// Normalize a `lines` payload into groups using the same line rule as the
/// primary source.
///
/// # Errors
///
/// Scalars, or entries holding non-object selections, are rejected.
pub fn normalize_lines(payload: &Value) -> Result<Vec<SelectionGroup>, NormalizeError> {
    match payload {
        Value::Null => Ok(Vec::new()),
        Value::Array(entries) => {
            let mut groups = Vec::new();
            for (index, entry) in entries.iter().enumerate() {
                groups.extend(entry_group(entry, None, index)?);
            }
            Ok(groups)
        }
        Value::Object(map) => {
            let mut groups = Vec::new();
            for (index, (key, entry)) in map.iter().enumerate() {
                groups.extend(entry_group(entry, LineValue::parse(key), index)?);
            }
            Ok(groups)
        }
        other => Err(NormalizeError::UnrecognizedShape {
            found: fields::kind_name(other),
        }),
    }
}

fn entry_group(
    entry: &Value,
    keyed_line: Option<LineValue>,
    index: usize,
) -> Result<Option<SelectionGroup>, NormalizeError> {
    match entry {
        Value::Array(records) => {
            let selections = collect_records(records)?;
            let line = keyed_line.or_else(|| selections.iter().find_map(fields::line));
            Ok(non_empty(line, selections))
        }
        Value::Object(_) => {
            let entry_line = fields::line(entry).or(keyed_line);
            let selections = extract_selections(entry, entry_line.as_ref())?;
            let line = entry_line.or_else(|| selections.iter().find_map(fields::line));
            Ok(non_empty(line, selections))
        }
        Value::Null => Ok(None),
        other => Err(NormalizeError::InvalidRecord {
            index,
            found: fields::kind_name(other),
        }),
    }
}

fn non_empty(line: Option<LineValue>, selections: Vec<Value>) -> Option<SelectionGroup> {
    (!selections.is_empty()).then(|| SelectionGroup::new(line, selections))
}

/// Pull selections out of one entry, from collection keys first and then
/// side keys. Records inherit the entry's line when they declare none.
fn extract_selections(
    entry: &Value,
    entry_line: Option<&LineValue>,
) -> Result<Vec<Value>, NormalizeError> {
    let mut selections = Vec::new();

    for key in COLLECTION_KEYS {
        if let Some(Value::Array(records)) = entry.get(key) {
            selections.extend(collect_records(records)?);
        }
    }

    for side in SIDE_KEYS {
        let records = match entry.get(side) {
            Some(Value::Array(records)) => collect_records(records)?,
            Some(record @ Value::Object(_)) => vec![record.clone()],
            _ => continue,
        };
        for mut record in records {
            if let Value::Object(ref mut map) = record {
                map.entry("name")
                    .or_insert_with(|| Value::String((*side).to_string()));
            }
            selections.push(record);
        }
    }

    if let Some(line) = entry_line {
        for record in &mut selections {
            if fields::line(record).is_none() {
                if let Value::Object(map) = record {
                    map.insert("line".to_string(), line_to_json(line));
                }
            }
        }
    }

    Ok(selections)
}

fn line_to_json(line: &LineValue) -> Value {
    match line {
        LineValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        LineValue::Label(s) => Value::String(s.clone()),
    }
}

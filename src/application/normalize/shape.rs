//! Shape detection for raw `selections` payloads.

use serde_json::{Map, Value};

use super::NormalizeError;
use crate::application::fields;

/// The layout a market's selections arrive in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionShape<'a> {
    /// `{ "<line>": [record, ...], ... }`
    Dictionary(&'a Map<String, Value>),
    /// `[[record, ...], [record, ...]]`
    Nested(&'a [Value]),
    /// `[record, ...]`
    Flat(&'a [Value]),
    /// `null`, `[]` or `{}`.
    Empty,
}

/// Classify a payload. First match wins: dictionary, array-of-arrays, flat.
///
/// # Errors
///
/// Scalars and objects that hold no arrays are not a selections payload.
pub fn detect(payload: &Value) -> Result<SelectionShape<'_>, NormalizeError> {
    match payload {
        Value::Null => Ok(SelectionShape::Empty),
        Value::Object(map) if map.is_empty() => Ok(SelectionShape::Empty),
        Value::Object(map) => {
            if map.values().any(Value::is_array) {
                Ok(SelectionShape::Dictionary(map))
            } else {
                Err(NormalizeError::UnrecognizedShape {
                    found: "object without selection arrays",
                })
            }
        }
        Value::Array(items) if items.is_empty() => Ok(SelectionShape::Empty),
        Value::Array(items) => {
            if items[0].is_array() {
                Ok(SelectionShape::Nested(items))
            } else {
                Ok(SelectionShape::Flat(items))
            }
        }
        other => Err(NormalizeError::UnrecognizedShape {
            found: fields::kind_name(other),
        }),
    }
}

//! Group construction, one function per [`SelectionShape`].

use serde_json::{Map, Value};

use super::shape::SelectionShape;
use super::NormalizeError;
use crate::application::fields;
use crate::domain::selection::{LineValue, SelectionGroup};

/// Turn a detected shape into ordered line groups.
///
/// # Errors
///
/// Fails when a group contains something other than selection objects.
pub fn build_groups(shape: SelectionShape<'_>) -> Result<Vec<SelectionGroup>, NormalizeError> {
    match shape {
        SelectionShape::Dictionary(map) => from_dictionary(map),
        SelectionShape::Nested(groups) => from_nested(groups),
        SelectionShape::Flat(records) => from_flat(records),
        SelectionShape::Empty => Ok(Vec::new()),
    }
}

/// Each key is the group's line, in payload order; values that are not
/// arrays are ignored.
fn from_dictionary(map: &Map<String, Value>) -> Result<Vec<SelectionGroup>, NormalizeError> {
    let mut groups = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Value::Array(records) = value else {
            continue;
        };
        groups.push(SelectionGroup::new(
            LineValue::parse(key),
            collect_records(records)?,
        ));
    }
    Ok(groups)
}

/// Each inner array is a group. The line comes from the first record in the
/// inner array that declares one, never from the array's position.
fn from_nested(groups: &[Value]) -> Result<Vec<SelectionGroup>, NormalizeError> {
    groups
        .iter()
        .enumerate()
        .map(|(index, inner)| {
            let Value::Array(records) = inner else {
                return Err(NormalizeError::InvalidRecord {
                    index,
                    found: fields::kind_name(inner),
                });
            };
            let selections = collect_records(records)?;
            let line = selections.iter().find_map(fields::line);
            Ok(SelectionGroup::new(line, selections))
        })
        .collect()
}

/// Group records by their own line, first-seen order; no line goes to the
/// default group.
fn from_flat(records: &[Value]) -> Result<Vec<SelectionGroup>, NormalizeError> {
    let mut groups: Vec<(Option<String>, SelectionGroup)> = Vec::new();
    for record in collect_records(records)? {
        let line = fields::line(&record);
        let key = line.as_ref().map(ToString::to_string);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.selections.push(record),
            None => groups.push((key, SelectionGroup::new(line, vec![record]))),
        }
    }
    Ok(groups.into_iter().map(|(_, group)| group).collect())
}

/// Clone selection objects out of an array, rejecting anything else.
pub(super) fn collect_records(records: &[Value]) -> Result<Vec<Value>, NormalizeError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if record.is_object() {
                Ok(record.clone())
            } else {
                Err(NormalizeError::InvalidRecord {
                    index,
                    found: fields::kind_name(record),
                })
            }
        })
        .collect()
}

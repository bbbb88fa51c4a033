//! Merging primary and secondary groups, and selection de-duplication.

use std::collections::HashSet;

use serde_json::Value;

use crate::application::fields;
use crate::domain::selection::{LineKey, MarketClass, SelectionGroup};

/// Merge groups by canonical line key, keeping first-seen order.
///
/// Within each merged group, selections are de-duplicated by
/// [`identity_key`]; later duplicates are dropped.
#[must_use]
pub fn merge_groups<I>(class: MarketClass, groups: I) -> Vec<SelectionGroup>
where
    I: IntoIterator<Item = SelectionGroup>,
{
    let mut merged: Vec<(LineKey, SelectionGroup, HashSet<String>)> = Vec::new();

    for group in groups {
        let key = LineKey::canonical(class, group.line.as_ref());
        let index = match merged.iter().position(|(k, _, _)| *k == key) {
            Some(index) => index,
            None => {
                let line = match class {
                    MarketClass::LineBearing => group.line.clone(),
                    MarketClass::NonLine => None,
                };
                merged.push((key, SelectionGroup::new(line, Vec::new()), HashSet::new()));
                merged.len() - 1
            }
        };

        let (_, target, seen) = &mut merged[index];
        for selection in group.selections {
            if seen.insert(identity_key(&selection)) {
                target.selections.push(selection);
            }
        }
    }

    merged
        .into_iter()
        .map(|(_, group, _)| group)
        .filter(|group| !group.selections.is_empty())
        .collect()
}

/// Identity of a raw selection: its settlement id when present, otherwise a
/// composite of name, display name, odds and line.
#[must_use]
pub fn identity_key(selection: &Value) -> String {
    if let Some(external_id) = fields::external_id(selection) {
        return format!("id:{external_id}");
    }
    let part = |value: Option<String>| value.unwrap_or_default();
    format!(
        "composite:{}|{}|{}|{}",
        part(fields::text(selection, &["name"])),
        part(fields::text(selection, &["display_name", "displayName"])),
        part(fields::number(selection, fields::ODDS_KEYS).map(|o| o.to_string())),
        part(fields::line(selection).map(|l| l.to_string())),
    )
}

/// Decide whether a market's selections are split by line.
///
/// Market type and name keywords win; otherwise the market is line-bearing
/// when any observed line is a non-zero number or a label.
#[must_use]
pub fn classify(market: &Value, groups: &[SelectionGroup]) -> MarketClass {
    const NON_LINE: &[&str] = &["moneyline", "money line", "winner", "1x2", "match result", "outright"];
    const LINE: &[&str] = &["spread", "handicap", "total", "over/under", "over_under", "points", "run line", "puck line"];

    let descriptor = [
        fields::text(market, fields::MARKET_TYPE_KEYS),
        fields::text(market, fields::NAME_KEYS),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_ascii_lowercase();

    if NON_LINE.iter().any(|k| descriptor.contains(k)) {
        return MarketClass::NonLine;
    }
    if LINE.iter().any(|k| descriptor.contains(k)) {
        return MarketClass::LineBearing;
    }

    let has_real_line = groups.iter().any(|group| {
        group.line.as_ref().is_some_and(|line| !line.is_zero())
            || group
                .selections
                .iter()
                .filter_map(fields::line)
                .any(|line| !line.is_zero())
    });
    if has_real_line {
        MarketClass::LineBearing
    } else {
        MarketClass::NonLine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::selection::LineValue;
    use serde_json::json;

    #[test]
    fn test_merge_by_canonical_key_and_dedupe() {
        let primary = vec![SelectionGroup::new(
            Some(LineValue::Number(-1.5)),
            vec![json!({ "line_id": "A", "odds": 2.1 })],
        )];
        let secondary = vec![
            SelectionGroup::new(
                Some(LineValue::Label("-1.5".into())),
                vec![json!({ "line_id": "A", "odds": 2.2 }), json!({ "line_id": "B" })],
            ),
            SelectionGroup::new(Some(LineValue::Number(1.5)), vec![json!({ "line_id": "C" })]),
        ];

        let merged = merge_groups(MarketClass::LineBearing, primary.into_iter().chain(secondary));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].selections.len(), 2);
        // The first copy of "A" wins.
        assert_eq!(merged[0].selections[0]["odds"], json!(2.1));
        assert_eq!(merged[1].line, Some(LineValue::Number(1.5)));
    }

    #[test]
    fn test_non_line_market_collapses_to_default_bucket() {
        let groups = vec![
            SelectionGroup::new(Some(LineValue::Number(0.0)), vec![json!({ "line_id": "H" })]),
            SelectionGroup::new(None, vec![json!({ "line_id": "A" })]),
        ];
        let merged = merge_groups(MarketClass::NonLine, groups);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].line, None);
        assert_eq!(merged[0].selections.len(), 2);
    }

    #[test]
    fn test_composite_identity_without_external_id() {
        let a = json!({ "name": "Home", "odds": 1.8 });
        let b = json!({ "name": "Home", "odds": 1.8 });
        let c = json!({ "name": "Home", "odds": 1.9 });
        assert_eq!(identity_key(&a), identity_key(&b));
        assert_ne!(identity_key(&a), identity_key(&c));
    }

    #[test]
    fn test_classify_by_keywords_then_lines() {
        assert_eq!(classify(&json!({ "type": "moneyline" }), &[]), MarketClass::NonLine);
        assert_eq!(
            classify(&json!({ "name": "Total Points" }), &[]),
            MarketClass::LineBearing
        );

        let zero_lines = [SelectionGroup::new(Some(LineValue::Number(0.0)), vec![])];
        assert_eq!(classify(&json!({ "name": "Match" }), &zero_lines), MarketClass::NonLine);

        let real_lines = [SelectionGroup::new(None, vec![json!({ "line": 2.5 })])];
        assert_eq!(classify(&json!({ "name": "Match" }), &real_lines), MarketClass::LineBearing);
    }
}

//! Joining polled orders with catalog labels.

use serde::Serialize;

use crate::application::index::SelectionIndex;
use crate::domain::order::OrderRecord;

/// Label used when an order's line is not in the current index.
pub const UNKNOWN_SELECTION: &str = "Unknown selection";

/// An order plus the catalog context it was placed against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOrder {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub label: String,
    pub event_name: Option<String>,
    /// False when the line was not found in the index.
    pub resolved: bool,
}

/// Attach a `market · selection` label to each order.
///
/// Misses get [`UNKNOWN_SELECTION`]; order is preserved.
#[must_use]
pub fn enrich_orders(orders: &[OrderRecord], index: &SelectionIndex) -> Vec<EnrichedOrder> {
    orders
        .iter()
        .map(|order| match index.get(&order.line_id) {
            Some(record) => EnrichedOrder {
                order: order.clone(),
                label: record.label(),
                event_name: Some(record.event_name.clone()),
                resolved: true,
            },
            None => EnrichedOrder {
                order: order.clone(),
                label: UNKNOWN_SELECTION.to_string(),
                event_name: None,
                resolved: false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hierarchy::{HierarchyBuilder, RawCatalog, RawEvent, RawTournament};
    use crate::domain::order::{MatchingStatus, OrderStatus};
    use crate::domain::{LineId, WagerId};
    use serde_json::json;

    fn order(wager: &str, line: &str) -> OrderRecord {
        OrderRecord {
            wager_id: WagerId::from(wager),
            external_id: None,
            line_id: LineId::from(line),
            odds: 2.0,
            stake: 10.0,
            matched_stake: 0.0,
            unmatched_stake: 10.0,
            status: OrderStatus::Open,
            matching_status: MatchingStatus::Unmatched,
            created_at: None,
            updated_at: None,
        }
    }

    fn index() -> SelectionIndex {
        let catalog = RawCatalog {
            tournaments: vec![RawTournament {
                data: json!({ "id": "t1" }),
                events: vec![RawEvent {
                    data: json!({ "id": "e1", "name": "Hawks vs Bulls" }),
                    markets: vec![json!({
                        "id": "m1",
                        "name": "Moneyline",
                        "selections": [
                            { "id": "s1", "line_id": "L1", "name": "Hawks" },
                            { "id": "s2", "line_id": "L2", "name": "Bulls", "display_name": "Chicago" },
                        ],
                    })],
                }],
            }],
        };
        SelectionIndex::build(&HierarchyBuilder::default().build(&catalog).tree)
    }

    #[test]
    fn test_known_lines_get_labels() {
        let enriched = enrich_orders(&[order("w1", "L1"), order("w2", "L2")], &index());
        assert_eq!(enriched[0].label, "Moneyline · Hawks");
        assert_eq!(enriched[1].label, "Moneyline · Chicago");
        assert_eq!(enriched[0].event_name.as_deref(), Some("Hawks vs Bulls"));
        assert!(enriched.iter().all(|e| e.resolved));
    }

    #[test]
    fn test_missing_line_gets_placeholder() {
        let enriched = enrich_orders(&[order("w1", "gone"), order("w2", "L1")], &index());
        assert_eq!(enriched[0].label, UNKNOWN_SELECTION);
        assert!(!enriched[0].resolved);
        assert_eq!(enriched[0].order.wager_id.as_str(), "w1");
        assert!(enriched[1].resolved);
    }

    #[test]
    fn test_empty_index_labels_everything_unknown() {
        let enriched = enrich_orders(&[order("w1", "L1")], &SelectionIndex::empty());
        assert_eq!(enriched[0].label, UNKNOWN_SELECTION);
    }
}

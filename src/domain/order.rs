//! Wager (order) records and history queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, LineId, MarketId, WagerId};

/// Lifecycle status of a wager as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Settled,
    Cancelled,
    Void,
    #[serde(other)]
    Unknown,
}

/// How much of the stake has found a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStatus {
    Unmatched,
    PartiallyMatched,
    FullyMatched,
    #[serde(other)]
    Unknown,
}

/// One wager as reported by the venue's history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(alias = "id")]
    pub wager_id: WagerId,
    #[serde(default)]
    pub external_id: Option<String>,
    pub line_id: LineId,
    pub odds: f64,
    pub stake: f64,
    #[serde(default)]
    pub matched_stake: f64,
    #[serde(default)]
    pub unmatched_stake: f64,
    pub status: OrderStatus,
    #[serde(default = "default_matching_status")]
    pub matching_status: MatchingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_matching_status() -> MatchingStatus {
    MatchingStatus::Unknown
}

/// Filter for the cursor-paginated wager history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_id: Option<MarketId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_status: Option<MatchingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl HistoryQuery {
    /// Query/string pairs suitable for a GET request.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("from".to_string(), self.from.to_rfc3339()),
            ("to".to_string(), self.to.to_rfc3339()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(ref event_id) = self.event_id {
            pairs.push(("event_id".to_string(), event_id.to_string()));
        }
        if let Some(ref market_id) = self.market_id {
            pairs.push(("market_id".to_string(), market_id.to_string()));
        }
        if let Some(status) = self.matching_status {
            pairs.push(("matching_status".to_string(), enum_str(&status)));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), enum_str(&status)));
        }
        if let Some(ref cursor) = self.cursor {
            pairs.push(("cursor".to_string(), cursor.clone()));
        }
        pairs
    }
}

fn enum_str<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// One page of wager history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default, alias = "wagers", alias = "orders")]
    pub data: Vec<OrderRecord>,
    /// Absent when there are no more pages.
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

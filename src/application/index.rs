//! Selection index over one catalog snapshot, and the cache that swaps
//! snapshots in.
//!
//! The index is a single flat table keyed by `(event, market, line key,
//! selection)` plus a secondary map by settlement line id. A snapshot is
//! immutable once built; [`SelectionCache::rebuild`] builds a new one and
//! swaps it in, so readers see either the previous complete snapshot or the
//! next one.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::selection::{LineKey, SelectionRecord};
use crate::domain::tree::{NodeData, TreeNode};
use crate::domain::{EventId, LineId, MarketId, SelectionId};

/// Composite key of the flat selection table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionKey {
    pub event_id: EventId,
    pub market_id: MarketId,
    pub line_key: LineKey,
    pub internal_id: SelectionId,
}

/// Lookup filters. `external_id` short-circuits every other filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionQuery {
    pub external_id: Option<LineId>,
    pub event_id: Option<EventId>,
    pub market_id: Option<MarketId>,
    pub line_key: Option<LineKey>,
    pub internal_id: Option<SelectionId>,
    pub name: Option<String>,
}

impl SelectionQuery {
    #[must_use]
    pub fn by_external_id(id: impl Into<LineId>) -> Self {
        Self {
            external_id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn event(mut self, id: impl Into<EventId>) -> Self {
        self.event_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn market(mut self, id: impl Into<MarketId>) -> Self {
        self.market_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn line(mut self, key: impl Into<LineKey>) -> Self {
        self.line_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn internal(mut self, id: impl Into<SelectionId>) -> Self {
        self.internal_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Summary counters for one index snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub events: usize,
    pub markets: usize,
    pub selections: usize,
    pub external_ids: usize,
    /// Selections seen without a settlement id.
    pub ineligible: usize,
    /// Selections dropped because their composite key was already taken.
    pub duplicates: usize,
    pub rebuilt_at: Option<DateTime<Utc>>,
}

/// Immutable selection index for one catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    records: BTreeMap<SelectionKey, SelectionRecord>,
    by_external_id: HashMap<LineId, SelectionKey>,
    ineligible: usize,
    duplicates: usize,
    rebuilt_at: Option<DateTime<Utc>>,
}

struct WalkContext<'a> {
    event: Option<(&'a str, &'a str)>,
    market: Option<(&'a str, &'a str)>,
}

impl SelectionIndex {
    /// An index with nothing in it and no rebuild timestamp.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk the tree once and index every eligible selection.
    #[must_use]
    pub fn build(tree: &[TreeNode]) -> Self {
        let mut index = Self {
            rebuilt_at: Some(Utc::now()),
            ..Self::default()
        };
        for root in tree {
            index.walk(
                root,
                &WalkContext {
                    event: None,
                    market: None,
                },
            );
        }
        index
    }

    fn walk(&mut self, node: &TreeNode, ctx: &WalkContext<'_>) {
        match node.data {
            NodeData::Event(_) => {
                let ctx = WalkContext {
                    event: Some((&node.id, &node.name)),
                    market: None,
                };
                for child in &node.children {
                    self.walk(child, &ctx);
                }
            }
            NodeData::Market(_) => {
                let ctx = WalkContext {
                    event: ctx.event,
                    market: Some((&node.id, &node.name)),
                };
                for child in &node.children {
                    self.walk(child, &ctx);
                }
            }
            NodeData::Selection(ref data) => self.insert_selection(node, data, ctx),
            NodeData::Tournament | NodeData::Category | NodeData::Line(_) => {
                for child in &node.children {
                    self.walk(child, ctx);
                }
            }
        }
    }

    fn insert_selection(
        &mut self,
        node: &TreeNode,
        data: &crate::domain::tree::SelectionData,
        ctx: &WalkContext<'_>,
    ) {
        let Some(external_id) = data.external_id.clone() else {
            self.ineligible += 1;
            return;
        };
        let (Some((event_id, event_name)), Some((market_id, market_name))) = (ctx.event, ctx.market)
        else {
            debug!(selection = %node.id, "Selection outside an event/market, not indexed");
            self.ineligible += 1;
            return;
        };

        let key = SelectionKey {
            event_id: EventId::from(event_id),
            market_id: MarketId::from(market_id),
            line_key: data.line_key.clone(),
            internal_id: SelectionId::from(node.id.as_str()),
        };
        if self.records.contains_key(&key) {
            self.duplicates += 1;
            return;
        }

        let record = SelectionRecord {
            external_id: external_id.clone(),
            internal_id: key.internal_id.clone(),
            name: node.name.clone(),
            display_name: data.display_name.clone(),
            odds: data.odds,
            stake: data.stake,
            line: data.line.clone(),
            event_id: key.event_id.clone(),
            event_name: event_name.to_string(),
            market_id: key.market_id.clone(),
            market_name: market_name.to_string(),
            line_key: key.line_key.clone(),
            raw: data.raw.clone(),
        };
        // A repeated settlement id points at the latest selection carrying it.
        self.by_external_id.insert(external_id, key.clone());
        self.records.insert(key, record);
    }

    /// Direct lookup by settlement line id.
    #[must_use]
    pub fn get(&self, external_id: &LineId) -> Option<&SelectionRecord> {
        self.by_external_id
            .get(external_id)
            .and_then(|key| self.records.get(key))
    }

    /// First selection matching `query`, in key order.
    #[must_use]
    pub fn find(&self, query: &SelectionQuery) -> Option<&SelectionRecord> {
        if let Some(ref external_id) = query.external_id {
            return self.get(external_id);
        }

        self.scan(query.event_id.as_ref(), query.market_id.as_ref())
            .filter(|r| query.market_id.as_ref().map_or(true, |m| r.market_id == *m))
            .filter(|r| query.line_key.as_ref().map_or(true, |l| r.line_key == *l))
            .filter(|r| query.internal_id.as_ref().map_or(true, |i| r.internal_id == *i))
            .find(|r| {
                query.name.as_deref().map_or(true, |name| {
                    r.name.eq_ignore_ascii_case(name) || r.display_name.eq_ignore_ascii_case(name)
                })
            })
    }

    /// Every selection under `event_id`.
    #[must_use]
    pub fn selections_for_event(&self, event_id: &EventId) -> Vec<&SelectionRecord> {
        self.scan(Some(event_id), None).collect()
    }

    /// Every selection under `event_id` / `market_id`.
    #[must_use]
    pub fn selections_for_market(
        &self,
        event_id: &EventId,
        market_id: &MarketId,
    ) -> Vec<&SelectionRecord> {
        self.scan(Some(event_id), Some(market_id)).collect()
    }

    /// Every indexed selection, in key order.
    #[must_use]
    pub fn flatten(&self) -> Vec<&SelectionRecord> {
        self.records.values().collect()
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let events: HashSet<&EventId> = self.records.keys().map(|k| &k.event_id).collect();
        let markets: HashSet<(&EventId, &MarketId)> = self
            .records
            .keys()
            .map(|k| (&k.event_id, &k.market_id))
            .collect();
        IndexStats {
            events: events.len(),
            markets: markets.len(),
            selections: self.records.len(),
            external_ids: self.by_external_id.len(),
            ineligible: self.ineligible,
            duplicates: self.duplicates,
            rebuilt_at: self.rebuilt_at,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Range scan narrowed to an event (and market) prefix when given.
    fn scan(
        &self,
        event_id: Option<&EventId>,
        market_id: Option<&MarketId>,
    ) -> Box<dyn Iterator<Item = &SelectionRecord> + '_> {
        let Some(event_id) = event_id.cloned() else {
            return Box::new(self.records.values());
        };
        let market_id = market_id.cloned();

        let lower = SelectionKey {
            event_id: event_id.clone(),
            market_id: market_id.clone().unwrap_or_else(|| MarketId::new("")),
            line_key: LineKey::from(""),
            internal_id: SelectionId::new(""),
        };
        Box::new(
            self.records
                .range((Bound::Included(lower), Bound::Unbounded))
                .take_while(move |(key, _)| {
                    key.event_id == event_id
                        && market_id.as_ref().map_or(true, |m| key.market_id == *m)
                })
                .map(|(_, record)| record),
        )
    }
}

/// Notification sent after a rebuild.
#[derive(Debug, Clone)]
pub struct IndexUpdate {
    pub stats: IndexStats,
}

/// Thread-safe holder of the current [`SelectionIndex`] snapshot.
pub struct SelectionCache {
    current: RwLock<Arc<SelectionIndex>>,
    /// Wrapped in Option to allow construction without notifications.
    tx: Option<broadcast::Sender<IndexUpdate>>,
}

impl SelectionCache {
    /// Create an empty cache without notifications.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(SelectionIndex::empty())),
            tx: None,
        }
    }

    /// Create an empty cache that broadcasts an [`IndexUpdate`] per rebuild.
    #[must_use]
    pub fn with_notifications(capacity: usize) -> (Self, broadcast::Receiver<IndexUpdate>) {
        let (tx, rx) = broadcast::channel(capacity);
        let cache = Self {
            current: RwLock::new(Arc::new(SelectionIndex::empty())),
            tx: Some(tx),
        };
        (cache, rx)
    }

    /// Returns `None` if the cache was created without notifications.
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<IndexUpdate>> {
        self.tx.as_ref().map(|tx| tx.subscribe())
    }

    /// Build a fresh index from `tree` and swap it in.
    pub fn rebuild(&self, tree: &[TreeNode]) -> IndexStats {
        let index = Arc::new(SelectionIndex::build(tree));
        let stats = index.stats();
        *self.current.write() = index;

        info!(
            events = stats.events,
            markets = stats.markets,
            selections = stats.selections,
            ineligible = stats.ineligible,
            "Selection index rebuilt"
        );
        if let Some(ref tx) = self.tx {
            let _ = tx.send(IndexUpdate {
                stats: stats.clone(),
            });
        }
        stats
    }

    /// Drop the current snapshot.
    pub fn clear(&self) {
        *self.current.write() = Arc::new(SelectionIndex::empty());
    }

    /// The current snapshot. Holding it keeps that snapshot alive.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SelectionIndex> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn find(&self, query: &SelectionQuery) -> Option<SelectionRecord> {
        self.current.read().find(query).cloned()
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        self.current.read().stats()
    }
}

impl Default for SelectionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::hierarchy::{HierarchyBuilder, RawCatalog, RawEvent, RawTournament};
    use serde_json::{json, Value};

    fn tree(markets: Vec<Value>) -> Vec<TreeNode> {
        let catalog = RawCatalog {
            tournaments: vec![RawTournament {
                data: json!({ "id": "t1" }),
                events: vec![
                    RawEvent {
                        data: json!({ "id": "e1", "name": "Hawks vs Bulls" }),
                        markets,
                    },
                    RawEvent {
                        data: json!({ "id": "e2", "name": "Nets vs Heat" }),
                        markets: vec![json!({
                            "id": "m9",
                            "name": "Moneyline",
                            "selections": [{ "id": "s9", "line_id": "Z", "name": "Nets" }],
                        })],
                    },
                ],
            }],
        };
        HierarchyBuilder::default().build(&catalog).tree
    }

    fn sample() -> Vec<TreeNode> {
        tree(vec![
            json!({
                "id": "m1",
                "name": "Spread",
                "selections": {
                    "-1.5": [{ "id": "s1", "line_id": "A", "name": "Hawks", "odds": 2.1 }],
                    "1.5": [{ "id": "s2", "line_id": "B", "name": "Bulls", "odds": 1.9 }],
                },
            }),
            json!({
                "id": "m2",
                "name": "Moneyline",
                "selections": [
                    { "id": "s3", "line_id": "H", "name": "Hawks" },
                    { "id": "s4", "name": "Bulls" },
                ],
            }),
        ])
    }

    #[test]
    fn test_empty_tree_yields_empty_index() {
        let index = SelectionIndex::build(&[]);
        let stats = index.stats();
        assert_eq!(stats.events, 0);
        assert_eq!(stats.markets, 0);
        assert_eq!(stats.selections, 0);
        assert_eq!(stats.external_ids, 0);
        assert!(stats.rebuilt_at.is_some());
        assert!(index.flatten().is_empty());
    }

    #[test]
    fn test_find_by_external_id() {
        let index = SelectionIndex::build(&sample());
        for id in ["A", "B", "H", "Z"] {
            let record = index.find(&SelectionQuery::by_external_id(id)).unwrap();
            assert_eq!(record.external_id.as_str(), id);
        }
        assert!(index.find(&SelectionQuery::by_external_id("nope")).is_none());

        // Fast path ignores contradicting filters.
        let query = SelectionQuery::by_external_id("A").event("e2");
        assert_eq!(index.find(&query).unwrap().internal_id.as_str(), "s1");
    }

    #[test]
    fn test_ineligible_selection_excluded() {
        let index = SelectionIndex::build(&sample());
        let stats = index.stats();
        assert_eq!(stats.selections, 4);
        assert_eq!(stats.ineligible, 1);
        assert!(index.flatten().iter().all(|r| r.internal_id.as_str() != "s4"));
        let market = index.selections_for_market(&EventId::from("e1"), &MarketId::from("m2"));
        assert_eq!(market.len(), 1);
    }

    #[test]
    fn test_hierarchical_find() {
        let index = SelectionIndex::build(&sample());

        let by_line = SelectionQuery::default().event("e1").market("m1").line("1.5");
        assert_eq!(index.find(&by_line).unwrap().external_id.as_str(), "B");

        let by_name = SelectionQuery::default().event("e1").named("hawks");
        assert_eq!(index.find(&by_name).unwrap().market_id.as_str(), "m1");

        let by_market_only = SelectionQuery::default().market("m9");
        assert_eq!(index.find(&by_market_only).unwrap().external_id.as_str(), "Z");

        let miss = SelectionQuery::default().event("e1").internal("s9");
        assert!(index.find(&miss).is_none());
    }

    #[test]
    fn test_scan_results_outlive_the_query() {
        let index = SelectionIndex::build(&sample());
        let found = {
            let query = SelectionQuery::default().event("e1").market("m1").line("-1.5");
            index.find(&query)
        };
        let scoped = {
            let event = EventId::from("e1");
            let market = MarketId::from("m1");
            index.selections_for_market(&event, &market)
        };
        assert_eq!(found.unwrap().external_id.as_str(), "A");
        assert_eq!(scoped.len(), 2);
    }

    #[test]
    fn test_scoped_enumeration_and_stats() {
        let index = SelectionIndex::build(&sample());
        assert_eq!(index.selections_for_event(&EventId::from("e1")).len(), 3);
        assert_eq!(index.selections_for_event(&EventId::from("e2")).len(), 1);
        assert!(index.selections_for_event(&EventId::from("e3")).is_empty());

        let stats = index.stats();
        assert_eq!(stats.events, 2);
        assert_eq!(stats.markets, 3);
        assert_eq!(stats.external_ids, 4);
    }

    #[test]
    fn test_record_carries_labels() {
        let index = SelectionIndex::build(&sample());
        let record = index.get(&LineId::from("A")).unwrap();
        assert_eq!(record.event_name, "Hawks vs Bulls");
        assert_eq!(record.label(), "Spread · Hawks");
        assert_eq!(record.line_key.as_str(), "-1.5");
    }

    #[tokio::test]
    async fn test_cache_swaps_snapshots() {
        let (cache, mut rx) = SelectionCache::with_notifications(4);
        let before = cache.snapshot();

        let stats = cache.rebuild(&sample());
        assert_eq!(stats.selections, 4);

        // An old snapshot is unaffected by the rebuild.
        assert!(before.is_empty());
        assert_eq!(cache.snapshot().len(), 4);

        let update = rx.recv().await.unwrap();
        assert_eq!(update.stats.selections, 4);

        cache.clear();
        assert!(cache.find(&SelectionQuery::by_external_id("A")).is_none());
    }
}

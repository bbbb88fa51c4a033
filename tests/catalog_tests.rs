mod support;

use linebook::application::normalize::normalize_market;
use linebook::application::{HierarchyBuilder, SelectionCache, SelectionIndex, SelectionQuery};
use linebook::domain::selection::{LineKey, LineValue, MarketClass};
use linebook::domain::{EventId, MarketId, NodeData, NodeKind};
use linebook::testkit::catalog::sample_catalog;
use serde_json::json;

use support::catalog::{moneyline_market, single_event, spread_market};
use support::tree::{eligible_ids, market, nodes_of_kind};

#[test]
fn dictionary_market_yields_two_line_groups_and_line_layer() {
    let normalized = normalize_market(&spread_market()).unwrap();
    assert_eq!(normalized.class, MarketClass::LineBearing);
    let lines: Vec<_> = normalized.groups.iter().map(|g| g.line.clone()).collect();
    assert_eq!(
        lines,
        vec![Some(LineValue::Number(-1.5)), Some(LineValue::Number(1.5))]
    );
    assert!(normalized.groups.iter().all(|g| g.selections.len() == 1));

    let output = HierarchyBuilder::default().build(&single_event(vec![spread_market()]));
    let node = market(&output.tree, "m1");
    assert_eq!(node.children.len(), 2);
    assert!(node.children.iter().all(|c| c.kind() == NodeKind::Line));
    for line in &node.children {
        assert_eq!(line.children.len(), 1);
        assert_eq!(line.children[0].kind(), NodeKind::Selection);
    }
}

#[test]
fn moneyline_market_attaches_selections_directly() {
    let normalized = normalize_market(&moneyline_market()).unwrap();
    assert_eq!(normalized.groups.len(), 1);
    assert!(normalized.groups[0].line.is_none());

    let output = HierarchyBuilder::default().build(&single_event(vec![moneyline_market()]));
    let node = market(&output.tree, "m2");
    let names: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Home", "Away"]);
    assert!(node.children.iter().all(|c| c.kind() == NodeKind::Selection));
    assert!(nodes_of_kind(&output.tree, NodeKind::Line).is_empty());

    let index = SelectionIndex::build(&output.tree);
    let home = index.get(&"H".into()).unwrap();
    assert!(home.line_key.is_default());
}

#[test]
fn single_line_spread_keeps_line_on_selections() {
    let output = HierarchyBuilder::default().build(&single_event(vec![json!({
        "id": "m3",
        "name": "Spread",
        "selections": { "-3.5": [
            { "line_id": "S1", "name": "Hawks" },
            { "line_id": "S2", "name": "Bulls" },
        ] },
    })]));

    let node = market(&output.tree, "m3");
    assert!(node.children.iter().all(|c| c.kind() == NodeKind::Selection));
    let NodeData::Selection(ref first) = node.children[0].data else {
        panic!("expected selection");
    };
    assert_eq!(first.line_key, LineKey::from("-3.5"));
}

#[test]
fn find_returns_every_eligible_selection() {
    let output = HierarchyBuilder::default().build(&sample_catalog());
    let cache = SelectionCache::new();
    cache.rebuild(&output.tree);

    let ids = eligible_ids(&output.tree);
    assert_eq!(ids.len(), 8);
    for id in &ids {
        let record = cache
            .find(&SelectionQuery::by_external_id(id.clone()))
            .unwrap_or_else(|| panic!("{id} not indexed"));
        assert_eq!(&record.external_id, id);
    }
    assert!(cache
        .find(&SelectionQuery::by_external_id("NOT-THERE"))
        .is_none());
}

#[test]
fn composite_query_narrows_by_event_and_market() {
    let output = HierarchyBuilder::default().build(&sample_catalog());
    let index = SelectionIndex::build(&output.tree);

    let hit = index
        .find(
            &SelectionQuery::default()
                .event("e2")
                .market("m-total")
                .line("212.5")
                .named("Over"),
        )
        .unwrap();
    assert_eq!(hit.external_id.as_str(), "L-OVER-212");

    let miss = index.find(&SelectionQuery::default().event("e1").market("m-total"));
    assert!(miss.is_none());

    // A settlement id wins over every other filter.
    let by_id = index
        .find(&SelectionQuery::by_external_id("L-OVER-212").event("e1"))
        .unwrap();
    assert_eq!(by_id.event_id.as_str(), "e2");

    assert_eq!(index.selections_for_event(&EventId::from("e1")).len(), 4);
    assert_eq!(
        index
            .selections_for_market(&EventId::from("e2"), &MarketId::from("m-total"))
            .len(),
        4
    );
}

#[test]
fn selections_without_external_id_are_never_enumerated() {
    let output = HierarchyBuilder::default().build(&single_event(vec![json!({
        "id": "m4",
        "name": "Winner",
        "selections": [
            { "line_id": "OK", "name": "Listed" },
            { "name": "Unlisted" },
        ],
    })]));

    let index = SelectionIndex::build(&output.tree);
    assert_eq!(index.flatten().len(), 1);
    assert_eq!(index.selections_for_event(&EventId::from("e1")).len(), 1);
    assert_eq!(
        index
            .selections_for_market(&EventId::from("e1"), &MarketId::from("m4"))
            .len(),
        1
    );
    assert_eq!(index.stats().ineligible, 1);
}

#[test]
fn empty_rebuild_clears_everything() {
    let cache = SelectionCache::new();
    cache.rebuild(&HierarchyBuilder::default().build(&sample_catalog()).tree);
    assert!(cache.stats().selections > 0);

    let stats = cache.rebuild(&[]);
    assert_eq!(stats.events, 0);
    assert_eq!(stats.markets, 0);
    assert_eq!(stats.selections, 0);
    assert!(cache.snapshot().flatten().is_empty());
}

#[test]
fn malformed_market_does_not_blank_the_catalog() {
    let output = HierarchyBuilder::default().build(&single_event(vec![
        json!({ "id": "broken", "selections": "nope" }),
        moneyline_market(),
    ]));

    assert_eq!(output.diagnostics.normalize_failures, 1);
    let index = SelectionIndex::build(&output.tree);
    assert_eq!(index.len(), 2);
}

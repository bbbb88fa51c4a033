//! A small catalog covering each selections layout.
//!
//! ```text
//! t1 Premier League
//! ├── e1 Hawks vs Bulls
//! │   ├── m-spread  Spread     (dictionary, two lines)
//! │   └── m-ml      Moneyline  (flat)
//! └── e2 Lions vs Tigers
//!     └── m-total   Total      (nested, two lines)
//! ```

use serde_json::{json, Value};

use super::venue::MockVenue;
use crate::application::hierarchy::{RawCatalog, RawEvent, RawTournament};

pub fn tournament() -> Value {
    json!({ "id": "t1", "name": "Premier League" })
}

pub fn events() -> Vec<Value> {
    vec![
        json!({
            "id": "e1",
            "home_team": "Hawks",
            "away_team": "Bulls",
            "starts_at": "2030-05-01T18:00:00Z",
        }),
        json!({
            "id": "e2",
            "home_team": "Lions",
            "away_team": "Tigers",
            "starts_at": "2030-05-02T18:00:00Z",
        }),
    ]
}

pub fn e1_markets() -> Vec<Value> {
    vec![
        json!({
            "id": "m-spread",
            "name": "Spread",
            "category": "Main",
            "market_type": "spread",
            "selections": {
                "-1.5": [
                    { "id": "s-spr-home", "line_id": "L-SPR-HOME", "name": "Hawks", "odds": 1.95, "stake": 120 },
                ],
                "1.5": [
                    { "id": "s-spr-away", "line_id": "L-SPR-AWAY", "name": "Bulls", "odds": 1.9, "stake": 80 },
                ],
            },
        }),
        json!({
            "id": "m-ml",
            "name": "Moneyline",
            "category": "Main",
            "market_type": "moneyline",
            "selections": [
                { "id": "s-ml-home", "line_id": "L-ML-HOME", "name": "Hawks", "american_odds": 110 },
                { "id": "s-ml-away", "line_id": "L-ML-AWAY", "name": "Bulls", "american_odds": -130 },
            ],
        }),
    ]
}

pub fn e2_markets() -> Vec<Value> {
    vec![json!({
        "id": "m-total",
        "name": "Total",
        "category": "Totals",
        "market_type": "total",
        "selections": [
            [
                { "id": "s-over-210", "line_id": "L-OVER-210", "name": "Over", "line": 210.5, "odds": 1.91 },
                { "id": "s-under-210", "line_id": "L-UNDER-210", "name": "Under", "line": 210.5, "odds": 1.91 },
            ],
            [
                { "id": "s-over-212", "line_id": "L-OVER-212", "name": "Over", "line": 212.5, "odds": 2.05 },
                { "id": "s-under-212", "line_id": "L-UNDER-212", "name": "Under", "line": 212.5, "odds": 1.8 },
            ],
        ],
    })]
}

/// The sample as an already-fetched raw catalog.
pub fn sample_catalog() -> RawCatalog {
    let mut events = events().into_iter();
    let e1 = events.next().unwrap_or_default();
    let e2 = events.next().unwrap_or_default();
    RawCatalog {
        tournaments: vec![RawTournament {
            data: tournament(),
            events: vec![
                RawEvent {
                    data: e1,
                    markets: e1_markets(),
                },
                RawEvent {
                    data: e2,
                    markets: e2_markets(),
                },
            ],
        }],
    }
}

/// The sample served by a [`MockVenue`].
pub fn sample_venue() -> MockVenue {
    MockVenue::new()
        .with_tournament(tournament())
        .with_events("t1", events())
        .with_markets("e1", e1_markets())
        .with_markets("e2", e2_markets())
}

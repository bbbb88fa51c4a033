use serde_json::{json, Value};

use linebook::application::hierarchy::{RawCatalog, RawEvent, RawTournament};

/// One tournament, one event, the given markets.
pub fn single_event(markets: Vec<Value>) -> RawCatalog {
    RawCatalog {
        tournaments: vec![RawTournament {
            data: json!({ "id": "t1", "name": "League" }),
            events: vec![RawEvent {
                data: json!({ "id": "e1", "name": "Hawks vs Bulls" }),
                markets,
            }],
        }],
    }
}

pub fn spread_market() -> Value {
    json!({
        "id": "m1",
        "name": "Spread",
        "selections": {
            "-1.5": [{ "line_id": "A", "odds": 2.1 }],
            "1.5": [{ "line_id": "B", "odds": 1.9 }],
        },
    })
}

pub fn moneyline_market() -> Value {
    json!({
        "id": "m2",
        "name": "Moneyline",
        "selections": [
            { "line_id": "H", "name": "Home" },
            { "line_id": "A2", "name": "Away" },
        ],
    })
}

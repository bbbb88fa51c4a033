//! In-memory venue implementing both [`CatalogSource`] and [`WagerApi`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::domain::{
    CancelRequest, EventId, HistoryPage, HistoryQuery, LineId, MatchingStatus, OrderRecord,
    OrderStatus, PriceLadder, TournamentId, WagerAck, WagerId, WagerRequest,
};
use crate::error::{Error, Result};
use crate::port::{CatalogSource, WagerApi};

/// An open, unmatched wager on `line_id`.
pub fn order(wager_id: &str, line_id: &str) -> OrderRecord {
    OrderRecord {
        wager_id: WagerId::from(wager_id),
        external_id: None,
        line_id: LineId::from(line_id),
        odds: 2.0,
        stake: 10.0,
        matched_stake: 0.0,
        unmatched_stake: 10.0,
        status: OrderStatus::Open,
        matching_status: MatchingStatus::Unmatched,
        created_at: Some(Utc::now()),
        updated_at: None,
    }
}

/// Catalog listings are keyed by parent id. History pages are queued;
/// an empty queue answers with an empty page.
pub struct MockVenue {
    tournaments: Vec<Value>,
    events: HashMap<String, Vec<Value>>,
    markets: HashMap<String, Vec<Value>>,
    ladder: Vec<f64>,
    fail_tournaments: AtomicBool,
    failing_events: Mutex<HashSet<String>>,
    failing_markets: Mutex<HashSet<String>>,
    history: Mutex<VecDeque<Result<HistoryPage>>>,
    history_queries: Mutex<Vec<HistoryQuery>>,
    placed: Mutex<Vec<WagerRequest>>,
    cancelled: Mutex<Vec<CancelRequest>>,
    catalog_calls: AtomicU32,
}

impl MockVenue {
    pub fn new() -> Self {
        Self {
            tournaments: Vec::new(),
            events: HashMap::new(),
            markets: HashMap::new(),
            ladder: Vec::new(),
            fail_tournaments: AtomicBool::new(false),
            failing_events: Mutex::new(HashSet::new()),
            failing_markets: Mutex::new(HashSet::new()),
            history: Mutex::new(VecDeque::new()),
            history_queries: Mutex::new(Vec::new()),
            placed: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            catalog_calls: AtomicU32::new(0),
        }
    }

    pub fn with_tournament(mut self, tournament: Value) -> Self {
        self.tournaments.push(tournament);
        self
    }

    pub fn with_events(mut self, tournament_id: &str, events: Vec<Value>) -> Self {
        self.events.insert(tournament_id.to_string(), events);
        self
    }

    pub fn with_markets(mut self, event_id: &str, markets: Vec<Value>) -> Self {
        self.markets.insert(event_id.to_string(), markets);
        self
    }

    pub fn with_ladder(mut self, ticks: Vec<f64>) -> Self {
        self.ladder = ticks;
        self
    }

    pub fn fail_tournaments(&self, fail: bool) {
        self.fail_tournaments.store(fail, Ordering::SeqCst);
    }

    pub fn fail_events_for(&self, tournament_id: &str) {
        self.failing_events.lock().unwrap().insert(tournament_id.to_string());
    }

    pub fn fail_markets_for(&self, event_id: &str) {
        self.failing_markets.lock().unwrap().insert(event_id.to_string());
    }

    pub fn push_history(&self, page: Result<HistoryPage>) {
        self.history.lock().unwrap().push_back(page);
    }

    pub fn history_queries(&self) -> Vec<HistoryQuery> {
        self.history_queries.lock().unwrap().clone()
    }

    pub fn placed(&self) -> Vec<WagerRequest> {
        self.placed.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<CancelRequest> {
        self.cancelled.lock().unwrap().clone()
    }

    /// Tournament, event and market listings served so far.
    pub fn catalog_calls(&self) -> u32 {
        self.catalog_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for MockVenue {
    async fn tournaments(&self) -> Result<Vec<Value>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_tournaments.load(Ordering::SeqCst) {
            return Err(Error::Connection("tournament listing unavailable".into()));
        }
        Ok(self.tournaments.clone())
    }

    async fn events(&self, tournament_id: &TournamentId) -> Result<Vec<Value>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_events.lock().unwrap().contains(tournament_id.as_str()) {
            return Err(Error::Connection(format!("events for {tournament_id} unavailable")));
        }
        Ok(self.events.get(tournament_id.as_str()).cloned().unwrap_or_default())
    }

    async fn markets(&self, event_id: &EventId) -> Result<Vec<Value>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_markets.lock().unwrap().contains(event_id.as_str()) {
            return Err(Error::Connection(format!("markets for {event_id} unavailable")));
        }
        Ok(self.markets.get(event_id.as_str()).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WagerApi for MockVenue {
    async fn odds_ladder(&self) -> Result<PriceLadder> {
        Ok(PriceLadder::new(self.ladder.clone()))
    }

    async fn place(&self, request: &WagerRequest) -> Result<WagerAck> {
        let mut placed = self.placed.lock().unwrap();
        placed.push(request.clone());
        Ok(WagerAck {
            wager_id: WagerId::new(format!("w-{}", placed.len())),
            external_id: Some(request.external_id.clone()),
            status: Some("accepted".into()),
        })
    }

    async fn cancel(&self, request: &CancelRequest) -> Result<()> {
        self.cancelled.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        self.history_queries.lock().unwrap().push(query.clone());
        let next = self.history.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(HistoryPage::default()))
    }
}

//! Typed venue client over the request orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::dto::{LadderResponse, Listing};
use crate::domain::{
    CancelRequest, EventId, HistoryPage, HistoryQuery, PriceLadder, TournamentId, WagerAck,
    WagerRequest,
};
use crate::error::Result;
use crate::infrastructure::request::RequestOrchestrator;
use crate::port::{ApiRequest, CatalogSource, WagerApi};

/// Catalog and wager endpoints. Every call goes through the orchestrator,
/// so it is bounded, retried and authenticated.
#[derive(Clone)]
pub struct VenueClient {
    requests: Arc<RequestOrchestrator>,
}

impl VenueClient {
    pub fn new(requests: Arc<RequestOrchestrator>) -> Self {
        Self { requests }
    }

    #[must_use]
    pub fn requests(&self) -> &Arc<RequestOrchestrator> {
        &self.requests
    }

    async fn listing(&self, path: String) -> Result<Vec<Value>> {
        let listing: Listing = self.requests.execute_json(&ApiRequest::get(path)).await?;
        Ok(listing.into_items())
    }
}

/// Absolute path from raw segments. Each segment is percent-encoded, so an
/// id containing `/` or `?` stays a single segment.
fn encoded_path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://venue/")?;
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    Ok(url.path().to_string())
}

#[async_trait]
impl CatalogSource for VenueClient {
    async fn tournaments(&self) -> Result<Vec<Value>> {
        self.listing("/tournaments".to_string()).await
    }

    async fn events(&self, tournament_id: &TournamentId) -> Result<Vec<Value>> {
        self.listing(encoded_path(&["tournaments", tournament_id.as_str(), "events"])?)
            .await
    }

    async fn markets(&self, event_id: &EventId) -> Result<Vec<Value>> {
        self.listing(encoded_path(&["events", event_id.as_str(), "markets"])?)
            .await
    }
}

#[async_trait]
impl WagerApi for VenueClient {
    async fn odds_ladder(&self) -> Result<PriceLadder> {
        let ladder: LadderResponse = self
            .requests
            .execute_json(&ApiRequest::get("/odds-ladder"))
            .await?;
        Ok(PriceLadder::new(ladder.into_ticks()))
    }

    async fn place(&self, request: &WagerRequest) -> Result<WagerAck> {
        let body = serde_json::to_value(request)?;
        self.requests
            .execute_json(&ApiRequest::post("/wagers", body))
            .await
    }

    async fn cancel(&self, request: &CancelRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;
        self.requests
            .execute(&ApiRequest::post("/wagers/cancel", body))
            .await?;
        Ok(())
    }

    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        let request = ApiRequest::get("/wagers").with_query(query.to_pairs());
        self.requests.execute_json(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineId, WagerStrategy};
    use crate::infrastructure::config::RequestConfig;
    use crate::port::{ApiResponse, Method};
    use crate::testkit::transport::ScriptedTransport;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn client(transport: &Arc<ScriptedTransport>) -> VenueClient {
        let requests = RequestOrchestrator::new(transport.clone(), &RequestConfig::default());
        VenueClient::new(Arc::new(requests))
    }

    #[tokio::test]
    async fn test_listing_paths_and_envelopes() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ApiResponse::new(200, r#"[{"id": "t1"}]"#));
        transport.push(ApiResponse::new(200, r#"{"data": [{"id": "e1"}, {"id": "e2"}]}"#));
        transport.push(ApiResponse::new(200, r#"{"markets": []}"#));
        let client = client(&transport);

        assert_eq!(client.tournaments().await.unwrap().len(), 1);
        assert_eq!(client.events(&TournamentId::from("t1")).await.unwrap().len(), 2);
        assert!(client.markets(&EventId::from("e1")).await.unwrap().is_empty());

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/tournaments", "/tournaments/t1/events", "/events/e1/markets"]);
    }

    #[tokio::test]
    async fn test_ids_are_encoded_as_single_segments() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ApiResponse::new(200, "[]"));
        transport.push(ApiResponse::new(200, "[]"));
        let client = client(&transport);

        client.events(&TournamentId::from("nfl/2026 wk1")).await.unwrap();
        client.markets(&EventId::from("e?1#x")).await.unwrap();

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec!["/tournaments/nfl%2F2026%20wk1/events", "/events/e%3F1%23x/markets"]
        );
    }

    #[tokio::test]
    async fn test_place_posts_wager_and_decodes_ack() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ApiResponse::new(200, r#"{"id": "w-9", "status": "accepted"}"#));
        let client = client(&transport);

        let request = WagerRequest::new(
            LineId::from("L1"),
            2.0,
            dec!(10),
            "order_1",
            Some(WagerStrategy::FillOrKill),
            &PriceLadder::default(),
        )
        .unwrap();
        let ack = client.place(&request).await.unwrap();
        assert_eq!(ack.wager_id.as_str(), "w-9");

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "/wagers");
        assert_eq!(sent.body.as_ref().unwrap()["wager_strategy"], "fillOrKill");
    }

    #[tokio::test]
    async fn test_history_sends_query_pairs() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ApiResponse::new(200, r#"{"data": [], "next_cursor": "c2"}"#));
        let client = client(&transport);

        let now = Utc::now();
        let query = HistoryQuery {
            event_id: None,
            market_id: None,
            matching_status: None,
            status: None,
            from: now,
            to: now,
            limit: 10,
            cursor: Some("c1".into()),
        };
        let page = client.history(&query).await.unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("c2"));

        let sent = &transport.requests()[0];
        assert!(sent.query.contains(&("cursor".to_string(), "c1".to_string())));
        assert!(sent.query.contains(&("limit".to_string(), "10".to_string())));
    }

    #[tokio::test]
    async fn test_ladder_decodes_wrapped_ticks() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(ApiResponse::new(200, r#"{"ladder": [2.0, 1.5, 3.0]}"#));
        let client = client(&transport);

        let ladder = client.odds_ladder().await.unwrap();
        assert_eq!(ladder.ticks(), &[1.5, 2.0, 3.0]);
    }
}

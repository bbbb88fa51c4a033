//! Catalog port: raw tournament, event and market payloads.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{EventId, TournamentId};
use crate::error::Result;

/// Source of raw catalog JSON, one level at a time.
///
/// Payloads are returned untyped; shape tolerance is the hierarchy
/// builder's job.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn tournaments(&self) -> Result<Vec<Value>>;

    async fn events(&self, tournament_id: &TournamentId) -> Result<Vec<Value>>;

    async fn markets(&self, event_id: &EventId) -> Result<Vec<Value>>;
}

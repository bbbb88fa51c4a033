//! Wager port: ladder, placement, cancellation and history.

use async_trait::async_trait;

use crate::domain::{CancelRequest, HistoryPage, HistoryQuery, PriceLadder, WagerAck, WagerRequest};
use crate::error::Result;

/// Typed access to the venue's wager endpoints.
#[async_trait]
pub trait WagerApi: Send + Sync {
    /// Fetch the valid odds ladder.
    async fn odds_ladder(&self) -> Result<PriceLadder>;

    /// Submit a validated wager.
    async fn place(&self, request: &WagerRequest) -> Result<WagerAck>;

    /// Cancel by wager id or external id.
    async fn cancel(&self, request: &CancelRequest) -> Result<()>;

    /// Fetch one page of wager history.
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage>;
}

//! Wager placement and cancellation against the current index and ladder.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::index::{SelectionCache, SelectionQuery};
use crate::domain::error::DomainError;
use crate::domain::wager::{generate_external_id, WagerStrategy};
use crate::domain::{CancelRequest, PriceLadder, SelectionRecord, WagerAck, WagerId, WagerRequest};
use crate::error::Result;
use crate::port::WagerApi;

/// What the caller wants to back, before validation.
#[derive(Debug, Clone)]
pub struct WagerIntent {
    pub selection: SelectionQuery,
    /// Decimal odds; snapped to the ladder before submission.
    pub odds: f64,
    pub stake: Decimal,
    /// Idempotency key; generated when absent.
    pub external_id: Option<String>,
    pub strategy: Option<WagerStrategy>,
}

/// A placed wager together with the selection it was placed on.
#[derive(Debug, Clone)]
pub struct Placement {
    pub selection: SelectionRecord,
    pub request: WagerRequest,
    pub ack: WagerAck,
}

/// Owns the odds ladder and turns intents into venue wagers.
pub struct WagerService {
    api: Arc<dyn WagerApi>,
    cache: Arc<SelectionCache>,
    ladder: RwLock<PriceLadder>,
}

impl WagerService {
    pub fn new(api: Arc<dyn WagerApi>, cache: Arc<SelectionCache>) -> Self {
        Self {
            api,
            cache,
            ladder: RwLock::new(PriceLadder::default()),
        }
    }

    /// Fetch the ladder from the venue and keep it. Returns the tick count.
    ///
    /// # Errors
    ///
    /// Returns the venue error; the previous ladder is kept.
    pub async fn load_ladder(&self) -> Result<usize> {
        let ladder = self.api.odds_ladder().await?;
        let ticks = ladder.len();
        if ladder.is_empty() {
            warn!("Venue returned an empty odds ladder; odds will not be snapped");
        }
        *self.ladder.write() = ladder;
        info!(ticks, "Odds ladder loaded");
        Ok(ticks)
    }

    #[must_use]
    pub fn ladder(&self) -> PriceLadder {
        self.ladder.read().clone()
    }

    pub fn set_ladder(&self, ladder: PriceLadder) {
        *self.ladder.write() = ladder;
    }

    /// Resolve the selection and validate the wager without sending it.
    ///
    /// # Errors
    ///
    /// [`DomainError::MissingSettlementId`] when no indexed selection matches;
    /// other [`DomainError`]s for invalid odds, stake or external id.
    pub fn prepare(&self, intent: &WagerIntent) -> Result<(SelectionRecord, WagerRequest)> {
        let selection = self
            .cache
            .find(&intent.selection)
            .ok_or(DomainError::MissingSettlementId)?;
        let external_id = intent
            .external_id
            .clone()
            .unwrap_or_else(generate_external_id);

        let request = WagerRequest::new(
            selection.external_id.clone(),
            intent.odds,
            intent.stake,
            external_id,
            intent.strategy,
            &self.ladder.read(),
        )?;
        Ok((selection, request))
    }

    /// Validate and submit a wager.
    ///
    /// # Errors
    ///
    /// Validation errors from [`prepare`](Self::prepare), or the venue error.
    pub async fn place(&self, intent: &WagerIntent) -> Result<Placement> {
        let (selection, request) = self.prepare(intent)?;
        let ack = self.api.place(&request).await?;
        info!(
            wager_id = %ack.wager_id,
            line_id = %request.line_id,
            odds = request.odds,
            stake = %request.stake,
            "Wager placed"
        );
        Ok(Placement {
            selection,
            request,
            ack,
        })
    }

    /// Cancel by wager id, external id, or both.
    ///
    /// # Errors
    ///
    /// [`DomainError::EmptyCancellation`] when neither id is given, or the
    /// venue error.
    pub async fn cancel(&self, wager_id: Option<WagerId>, external_id: Option<String>) -> Result<()> {
        let request = CancelRequest::new(wager_id, external_id)?;
        self.api.cancel(&request).await?;
        info!(wager_id = ?request.wager_id, external_id = ?request.external_id, "Wager cancelled");
        Ok(())
    }
}

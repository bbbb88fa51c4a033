//! Periodic, cursor-paginated wager history polling.
//!
//! [`OrderPoller`] keeps the caller's recent wagers fresh:
//!
//! - a periodic task calls [`refresh`](OrderPoller::refresh) every
//!   `interval_secs`, replacing the result set with the first page;
//! - [`load_more`](OrderPoller::load_more) appends the next page on demand;
//! - a failed refresh records the error and starts one independent backoff
//!   retry sequence. The periodic timer is never touched by failures.
//!
//! Each refresh and [`clear`](OrderPoller::clear) bumps a sequence number;
//! responses that come back for an older sequence are discarded. A clear
//! also ends any pending retry sequence.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::enrich::{enrich_orders, EnrichedOrder};
use crate::application::config::OrderPollingConfig;
use crate::application::index::SelectionIndex;
use crate::application::shutdown::{cancelled, sleep_or_cancel};
use crate::domain::order::{HistoryQuery, OrderRecord};
use crate::error::Result;
use crate::port::WagerApi;

/// Point-in-time view of the poller's state.
#[derive(Debug, Clone, Default)]
pub struct OrderSnapshot {
    pub orders: Vec<OrderRecord>,
    /// Cursor for the next page; `None` when there are no more pages.
    pub next_cursor: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub loading: bool,
    /// Failed retries since the last success or clear. The initial failed
    /// refresh is not counted.
    pub retry_attempts: u32,
}

#[derive(Debug, Default)]
struct PollState {
    snapshot: OrderSnapshot,
    /// Bumped by every refresh and clear.
    seq: u64,
    /// Bumped by clear only.
    epoch: u64,
    retry_pending: bool,
}

impl PollState {
    /// A retry is still wanted: no clear since `epoch` and no success since.
    fn still_failing(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.snapshot.last_error.is_some()
    }
}

/// Keeps wager history fresh. Construct, wrap in `Arc`, then [`start`](Self::start).
pub struct OrderPoller {
    api: Arc<dyn WagerApi>,
    config: OrderPollingConfig,
    state: Mutex<PollState>,
    shutdown_tx: watch::Sender<bool>,
}

impl OrderPoller {
    pub fn new(api: Arc<dyn WagerApi>, config: OrderPollingConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            api,
            config,
            state: Mutex::new(PollState::default()),
            shutdown_tx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &OrderPollingConfig {
        &self.config
    }

    #[must_use]
    pub fn snapshot(&self) -> OrderSnapshot {
        self.state.lock().snapshot.clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.state.lock().snapshot.orders.clone()
    }

    /// Current orders with catalog labels from `index`.
    #[must_use]
    pub fn enriched(&self, index: &SelectionIndex) -> Vec<EnrichedOrder> {
        enrich_orders(&self.state.lock().snapshot.orders, index)
    }

    fn query(&self, cursor: Option<String>) -> HistoryQuery {
        let to = Utc::now();
        HistoryQuery {
            event_id: self.config.event_id.clone(),
            market_id: self.config.market_id.clone(),
            matching_status: None,
            status: None,
            from: to - ChronoDuration::days(i64::from(self.config.window_days)),
            to,
            limit: self.config.page_limit,
            cursor,
        }
    }

    /// Reload the first page, replacing the current result set.
    ///
    /// On failure the error is recorded, a backoff retry sequence is started
    /// (unless one is already running) and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the history request's error.
    pub async fn refresh(self: &Arc<Self>) -> Result<usize> {
        match self.load_first_page().await {
            Ok(count) => Ok(count),
            Err(e) => {
                self.schedule_retry();
                Err(e)
            }
        }
    }

    /// Fetch the first page. Does not schedule retries.
    async fn load_first_page(&self) -> Result<usize> {
        let seq = {
            let mut state = self.state.lock();
            state.seq += 1;
            state.snapshot.loading = true;
            state.seq
        };

        let result = self.api.history(&self.query(None)).await;

        let mut state = self.state.lock();
        if state.seq != seq {
            debug!("Discarding superseded order refresh");
            return result.map(|page| page.data.len());
        }
        state.snapshot.loading = false;
        match result {
            Ok(page) => {
                let count = page.data.len();
                let snapshot = &mut state.snapshot;
                snapshot.orders = page.data;
                snapshot.next_cursor = page.next_cursor;
                snapshot.last_synced_at = page.last_synced_at;
                snapshot.refreshed_at = Some(Utc::now());
                snapshot.last_error = None;
                snapshot.retry_attempts = 0;
                debug!(orders = count, has_more = snapshot.next_cursor.is_some(), "Orders refreshed");
                Ok(count)
            }
            Err(e) => {
                state.snapshot.last_error = Some(e.to_string());
                warn!(error = %e, "Order refresh failed");
                Err(e)
            }
        }
    }

    /// Append the next page. Returns the number of orders appended.
    ///
    /// A no-op returning 0 when there is no cursor or a load is in flight.
    ///
    /// # Errors
    ///
    /// Returns the history request's error; it is recorded but not retried.
    pub async fn load_more(&self) -> Result<usize> {
        let (seq, cursor) = {
            let mut state = self.state.lock();
            if state.snapshot.loading {
                return Ok(0);
            }
            let Some(cursor) = state.snapshot.next_cursor.clone() else {
                return Ok(0);
            };
            state.snapshot.loading = true;
            (state.seq, cursor)
        };

        let result = self.api.history(&self.query(Some(cursor))).await;

        let mut state = self.state.lock();
        if state.seq != seq {
            debug!("Discarding page loaded before a refresh or clear");
            return Ok(0);
        }
        state.snapshot.loading = false;
        match result {
            Ok(page) => {
                let count = page.data.len();
                let snapshot = &mut state.snapshot;
                snapshot.orders.extend(page.data);
                snapshot.next_cursor = page.next_cursor;
                if page.last_synced_at.is_some() {
                    snapshot.last_synced_at = page.last_synced_at;
                }
                Ok(count)
            }
            Err(e) => {
                state.snapshot.last_error = Some(e.to_string());
                warn!(error = %e, "Loading more orders failed");
                Err(e)
            }
        }
    }

    /// Drop all results and reset cursor and retry state.
    ///
    /// The periodic timer keeps running; a pending retry sequence stops.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.seq += 1;
        state.epoch += 1;
        state.snapshot = OrderSnapshot::default();
    }

    fn schedule_retry(self: &Arc<Self>) {
        let (epoch, completed) = {
            let mut state = self.state.lock();
            if state.retry_pending || state.snapshot.retry_attempts >= self.config.max_retry_attempts {
                return;
            }
            state.retry_pending = true;
            (state.epoch, state.snapshot.retry_attempts)
        };

        let poller = Arc::clone(self);
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut attempt = completed;
            loop {
                if !poller.state.lock().still_failing(epoch) {
                    break;
                }
                attempt += 1;
                let delay = poller.config.retry_delay(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling order refresh retry");
                if sleep_or_cancel(delay, &mut shutdown).await.is_err() {
                    break;
                }
                if !poller.state.lock().still_failing(epoch) {
                    break;
                }

                if poller.load_first_page().await.is_ok() {
                    break;
                }
                {
                    // Counts retries that ran and failed.
                    let mut state = poller.state.lock();
                    if state.epoch == epoch {
                        state.snapshot.retry_attempts = attempt;
                    }
                }
                if attempt >= poller.config.max_retry_attempts {
                    warn!(attempts = attempt, "Order refresh retries exhausted");
                    break;
                }
            }
            poller.state.lock().retry_pending = false;
        });
    }

    /// Spawn the periodic refresh task. The first refresh runs immediately.
    pub fn start(self: &Arc<Self>) -> PollingHandle {
        let poller = Arc::clone(self);
        let mut shutdown = self.shutdown_tx.subscribe();
        let period = self.config.interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), "Order polling started");

            loop {
                tokio::select! {
                    () = cancelled(&mut shutdown) => {
                        info!("Order polling stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        // Failures are recorded and retried by the poller itself.
                        let _ = poller.refresh().await;
                    }
                }
            }
        });

        PollingHandle {
            shutdown_tx: self.shutdown_tx.clone(),
            task,
        }
    }
}

/// Stops an [`OrderPoller`]'s periodic task and pending retries.
pub struct PollingHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Signal shutdown and wait for the periodic task to exit. The poller
    /// cannot be started again afterwards.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::HistoryPage;
    use crate::error::Error;
    use crate::testkit::venue::{order, MockVenue};
    use std::time::Duration;

    fn page(ids: &[&str], cursor: Option<&str>) -> HistoryPage {
        HistoryPage {
            data: ids.iter().map(|id| order(id, "L1")).collect(),
            next_cursor: cursor.map(str::to_string),
            last_synced_at: None,
        }
    }

    fn poller(venue: &Arc<MockVenue>) -> Arc<OrderPoller> {
        let api: Arc<dyn WagerApi> = venue.clone();
        Arc::new(OrderPoller::new(api, OrderPollingConfig::default()))
    }

    #[tokio::test]
    async fn test_refresh_replaces_and_load_more_appends() {
        let venue = Arc::new(MockVenue::new());
        venue.push_history(Ok(page(&["w1", "w2"], Some("c1"))));
        venue.push_history(Ok(page(&["w3"], None)));
        venue.push_history(Ok(page(&["w9"], Some("c2"))));
        let poller = poller(&venue);

        assert_eq!(poller.refresh().await.unwrap(), 2);
        assert_eq!(poller.load_more().await.unwrap(), 1);
        assert_eq!(poller.orders().len(), 3);
        assert!(poller.snapshot().next_cursor.is_none());

        // Without a cursor load_more does nothing.
        assert_eq!(poller.load_more().await.unwrap(), 0);
        assert_eq!(venue.history_queries().len(), 2);

        poller.refresh().await.unwrap();
        let ids: Vec<String> = poller.orders().iter().map(|o| o.wager_id.to_string()).collect();
        assert_eq!(ids, vec!["w9"]);

        let queries = venue.history_queries();
        assert_eq!(queries[1].cursor.as_deref(), Some("c1"));
        assert!(queries[2].cursor.is_none());
        assert_eq!(queries[0].limit, 50);
        assert_eq!((queries[0].to - queries[0].from).num_days(), 7);
    }

    #[tokio::test]
    async fn test_clear_resets_state() {
        let venue = Arc::new(MockVenue::new());
        venue.push_history(Ok(page(&["w1"], Some("c1"))));
        let poller = poller(&venue);
        poller.refresh().await.unwrap();

        poller.clear();
        let snapshot = poller.snapshot();
        assert!(snapshot.orders.is_empty());
        assert!(snapshot.next_cursor.is_none());
        assert_eq!(snapshot.retry_attempts, 0);
        assert_eq!(poller.load_more().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_retries_with_backoff() {
        let venue = Arc::new(MockVenue::new());
        venue.push_history(Err(Error::Connection("reset".into())));
        venue.push_history(Err(Error::Connection("reset".into())));
        venue.push_history(Ok(page(&["w1"], None)));
        let poller = poller(&venue);

        assert!(poller.refresh().await.is_err());
        assert!(poller.snapshot().last_error.is_some());
        assert_eq!(poller.snapshot().retry_attempts, 0);

        // Scheduled but not yet run.
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(venue.history_queries().len(), 1);
        assert_eq!(poller.snapshot().retry_attempts, 0);

        // First retry at 1s fails, second after a further 2s succeeds.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(venue.history_queries().len(), 2);
        assert_eq!(poller.snapshot().retry_attempts, 1);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(venue.history_queries().len(), 3);
        let snapshot = poller.snapshot();
        assert_eq!(snapshot.orders.len(), 1);
        assert!(snapshot.last_error.is_none());
        assert_eq!(snapshot.retry_attempts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_retry() {
        let venue = Arc::new(MockVenue::new());
        venue.push_history(Err(Error::Connection("reset".into())));
        let poller = poller(&venue);

        assert!(poller.refresh().await.is_err());
        poller.clear();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(venue.history_queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_task_and_shutdown() {
        let venue = Arc::new(MockVenue::new());
        let poller = poller(&venue);

        let handle = poller.start();
        tokio::time::sleep(Duration::from_secs(25)).await;
        // Ticks at 0s, 12s and 24s.
        assert_eq!(venue.history_queries().len(), 3);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(venue.history_queries().len(), 3);
    }
}

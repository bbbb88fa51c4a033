//! Catalog sync: fetch the raw catalog, build the tree, swap the index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::config::CatalogConfig;
use crate::application::fields;
use crate::application::hierarchy::{
    BuildDiagnostics, HierarchyBuilder, RawCatalog, RawEvent, RawTournament,
};
use crate::application::index::{IndexStats, SelectionCache};
use crate::application::shutdown::{cancelled, sleep_or_cancel};
use crate::domain::{EventId, TournamentId, TreeNode};
use crate::error::{Error, Result};
use crate::port::CatalogSource;

const TOURNAMENT_ID_KEYS: &[&str] = &["id", "tournament_id", "tournamentId"];
const EVENT_ID_KEYS: &[&str] = &["id", "event_id", "eventId"];

/// Upstream calls made during one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub tournaments: usize,
    pub events: usize,
    pub markets: usize,
    /// Event or market listings that failed; their subtree is missing.
    pub failures: usize,
}

/// Outcome of one [`CatalogService::sync`].
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub fetch: FetchStats,
    pub diagnostics: BuildDiagnostics,
    pub index: IndexStats,
    pub synced_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Owns the catalog pipeline and the latest tree.
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    cache: Arc<SelectionCache>,
    builder: HierarchyBuilder,
    config: CatalogConfig,
    tree: RwLock<Arc<Vec<TreeNode>>>,
    last_report: RwLock<Option<SyncReport>>,
    shutdown: watch::Sender<bool>,
}

impl CatalogService {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        cache: Arc<SelectionCache>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            source,
            cache,
            builder: HierarchyBuilder::new(config.build_options()),
            config,
            tree: RwLock::new(Arc::new(Vec::new())),
            last_report: RwLock::new(None),
            shutdown: watch::channel(false).0,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<SelectionCache> {
        &self.cache
    }

    /// Tree from the last successful sync.
    #[must_use]
    pub fn tree(&self) -> Arc<Vec<TreeNode>> {
        Arc::clone(&self.tree.read())
    }

    #[must_use]
    pub fn last_report(&self) -> Option<SyncReport> {
        self.last_report.read().clone()
    }

    /// Fetch the raw catalog level by level.
    ///
    /// A failed event or market listing is logged and leaves that subtree
    /// empty; siblings are still fetched.
    ///
    /// # Errors
    ///
    /// Fails when the tournament listing itself fails, or with
    /// [`Error::Cancelled`] once [`CatalogHandle::shutdown`] has been called.
    pub async fn fetch(&self) -> Result<(RawCatalog, FetchStats)> {
        let mut shutdown = self.shutdown.subscribe();
        let mut stats = FetchStats::default();
        let tournaments = self.source.tournaments().await?;

        let mut catalog = RawCatalog::default();
        for data in tournaments {
            let Some(id) = fields::text(&data, TOURNAMENT_ID_KEYS) else {
                // Left for the builder to count as skipped.
                catalog.tournaments.push(RawTournament { data, events: Vec::new() });
                continue;
            };
            if !self.wanted(&id) {
                continue;
            }
            stats.tournaments += 1;

            self.pause(&mut shutdown).await?;
            let events = match self.source.events(&TournamentId::from(id.as_str())).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(tournament = %id, error = %e, "Event listing failed");
                    stats.failures += 1;
                    Vec::new()
                }
            };

            let mut raw_events = Vec::with_capacity(events.len());
            for event in events {
                stats.events += 1;
                let markets = self.fetch_markets(&event, &mut stats, &mut shutdown).await?;
                raw_events.push(RawEvent { data: event, markets });
            }
            catalog.tournaments.push(RawTournament { data, events: raw_events });
        }

        Ok((catalog, stats))
    }

    async fn fetch_markets(
        &self,
        event: &Value,
        stats: &mut FetchStats,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Vec<Value>> {
        let Some(id) = fields::text(event, EVENT_ID_KEYS) else {
            return Ok(Vec::new());
        };
        self.pause(shutdown).await?;
        let markets = match self.source.markets(&EventId::from(id.as_str())).await {
            Ok(markets) => {
                stats.markets += markets.len();
                markets
            }
            Err(e) => {
                warn!(event = %id, error = %e, "Market listing failed");
                stats.failures += 1;
                Vec::new()
            }
        };
        Ok(markets)
    }

    fn wanted(&self, tournament_id: &str) -> bool {
        self.config.tournament_ids.is_empty()
            || self.config.tournament_ids.iter().any(|id| id == tournament_id)
    }

    /// Pace upstream calls. Checked before every fetch even with no delay.
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
        let delay = self.config.fetch_delay();
        if delay.is_zero() {
            return if *shutdown.borrow() { Err(Error::Cancelled) } else { Ok(()) };
        }
        sleep_or_cancel(delay, shutdown).await
    }

    /// Fetch, build and swap in a new index.
    ///
    /// # Errors
    ///
    /// Fails when the tournament listing fails or the service is shut down
    /// mid-fetch; the previous index and tree are kept.
    pub async fn sync(&self) -> Result<SyncReport> {
        let started = Instant::now();
        let (raw, fetch) = self.fetch().await?;

        let output = self.builder.build(&raw);
        let index = self.cache.rebuild(&output.tree);
        *self.tree.write() = Arc::new(output.tree);

        let report = SyncReport {
            fetch,
            diagnostics: output.diagnostics,
            index,
            synced_at: Utc::now(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            tournaments = report.fetch.tournaments,
            events = report.fetch.events,
            markets = report.fetch.markets,
            fetch_failures = report.fetch.failures,
            selections = report.index.selections,
            elapsed_ms = report.elapsed_ms,
            "Catalog synced"
        );
        *self.last_report.write() = Some(report.clone());
        Ok(report)
    }

    /// Spawn periodic syncs every `poll_interval_secs`, starting now.
    pub fn start(self: &Arc<Self>) -> CatalogHandle {
        let mut shutdown_rx = self.shutdown.subscribe();
        let service = Arc::clone(self);
        let period: Duration = self.config.poll_interval();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancelled(&mut shutdown_rx) => {
                        debug!("Catalog polling stopped");
                        break;
                    }
                    _ = ticker.tick() => match service.sync().await {
                        Ok(_) => {}
                        Err(Error::Cancelled) => {
                            debug!("Catalog sync interrupted by shutdown");
                            break;
                        }
                        Err(e) => warn!(error = %e, "Catalog sync failed, keeping previous index"),
                    },
                }
            }
        });

        CatalogHandle { service: Arc::clone(self), task }
    }
}

/// Stops periodic catalog syncs.
pub struct CatalogHandle {
    service: Arc<CatalogService>,
    task: JoinHandle<()>,
}

impl CatalogHandle {
    /// Signal shutdown and wait for the task.
    ///
    /// An in-flight sync stops at its next paced fetch without swapping the
    /// index. The service refuses further syncs afterwards.
    pub async fn shutdown(self) {
        self.service.shutdown.send_replace(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::index::SelectionQuery;
    use crate::error::Error;
    use crate::testkit::catalog::sample_venue;

    fn service(venue: Arc<crate::testkit::venue::MockVenue>, config: CatalogConfig) -> CatalogService {
        let source: Arc<dyn CatalogSource> = venue;
        CatalogService::new(source, Arc::new(SelectionCache::new()), config)
    }

    fn fast() -> CatalogConfig {
        CatalogConfig {
            fetch_delay_ms: 0,
            ..CatalogConfig::default()
        }
    }

    #[tokio::test]
    async fn test_sync_builds_index() {
        let service = service(Arc::new(sample_venue()), fast());
        let report = service.sync().await.unwrap();

        assert_eq!(report.fetch.tournaments, 1);
        assert_eq!(report.fetch.events, 2);
        assert_eq!(report.fetch.failures, 0);
        assert!(report.index.selections > 0);
        assert!(service
            .cache()
            .find(&SelectionQuery::by_external_id("L-SPR-HOME"))
            .is_some());
        assert_eq!(service.tree().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_market_listing_is_isolated() {
        let venue = sample_venue();
        venue.fail_markets_for("e2");
        let service = service(Arc::new(venue), fast());

        let report = service.sync().await.unwrap();
        assert_eq!(report.fetch.failures, 1);
        // e1 still indexed.
        assert!(service
            .cache()
            .find(&SelectionQuery::by_external_id("L-ML-HOME"))
            .is_some());
    }

    #[tokio::test]
    async fn test_failed_tournament_listing_keeps_previous_index() {
        let venue = Arc::new(sample_venue());
        let service = service(Arc::clone(&venue), fast());
        service.sync().await.unwrap();
        let before = service.cache().stats().selections;

        venue.fail_tournaments(true);
        assert!(matches!(service.sync().await, Err(Error::Connection(_))));
        assert_eq!(service.cache().stats().selections, before);
    }

    #[tokio::test]
    async fn test_tournament_filter() {
        let config = CatalogConfig {
            tournament_ids: vec!["other".into()],
            ..fast()
        };
        let service = service(Arc::new(sample_venue()), config);
        let report = service.sync().await.unwrap();
        assert_eq!(report.fetch.tournaments, 0);
        assert_eq!(report.index.selections, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_delay_spaces_calls() {
        let config = CatalogConfig {
            fetch_delay_ms: 100,
            ..CatalogConfig::default()
        };
        let service = service(Arc::new(sample_venue()), config);
        let start = tokio::time::Instant::now();
        service.sync().await.unwrap();
        // One events call and two markets calls.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_paced_sync_returns_promptly() {
        let config = CatalogConfig {
            fetch_delay_ms: 60_000,
            poll_interval_secs: 3600,
            ..CatalogConfig::default()
        };
        let service = Arc::new(service(Arc::new(sample_venue()), config));
        let handle = service.start();

        // Parks the sync inside its first pause.
        tokio::time::sleep(Duration::from_secs(1)).await;
        let start = tokio::time::Instant::now();
        handle.shutdown().await;

        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(service.last_report().is_none());
        assert_eq!(service.cache().stats().selections, 0);
        assert!(matches!(service.sync().await, Err(Error::Cancelled)));
    }
}

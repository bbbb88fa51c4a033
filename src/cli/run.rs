//! Handler for the `run` command.

use std::sync::Arc;

use futures_util::future;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::application::{CatalogService, OrderPoller, SelectionCache, WagerService};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::{CatalogSource, WagerApi};

/// Index updates buffered for slow subscribers.
const UPDATE_CAPACITY: usize = 16;

/// Run catalog and order polling until Ctrl-C.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = args.config.load()?;
    info!(version = env!("CARGO_PKG_VERSION"), "linebook starting");

    let stack = bootstrap::connect(&config)?;
    let refresh = stack.start_refresh();

    let (cache, mut updates) = SelectionCache::with_notifications(UPDATE_CAPACITY);
    let cache = Arc::new(cache);

    let source: Arc<dyn CatalogSource> = stack.client.clone();
    let catalog = Arc::new(CatalogService::new(
        source,
        Arc::clone(&cache),
        config.catalog.clone(),
    ));

    let api: Arc<dyn WagerApi> = stack.client.clone();
    let wagers = WagerService::new(Arc::clone(&api), Arc::clone(&cache));
    if let Err(e) = wagers.load_ladder().await {
        warn!(error = %e, "Odds ladder unavailable, prices will not be snapped");
    }

    let catalog_handle = catalog.start();
    let orders = Arc::new(OrderPoller::new(api, config.orders.clone()));
    let orders_handle = (!args.no_orders).then(|| orders.start());

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    let enriched = orders.enriched(&cache.snapshot());
                    let unresolved = enriched.iter().filter(|o| !o.resolved).count();
                    info!(
                        selections = update.stats.selections,
                        orders = enriched.len(),
                        unresolved,
                        "Index rebuilt"
                    );
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Index update stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    stack.cancel();
    let orders_stopped = async {
        if let Some(handle) = orders_handle {
            handle.shutdown().await;
        }
    };
    let refresh_stopped = async {
        if let Some(handle) = refresh {
            handle.shutdown().await;
        }
    };
    future::join3(catalog_handle.shutdown(), orders_stopped, refresh_stopped).await;
    info!("linebook stopped");
    Ok(())
}

//! Handler for the `sync` command.

use std::sync::Arc;

use crate::application::{CatalogService, SelectionCache};
use crate::cli::{output, SyncArgs};
use crate::domain::NodeKind;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::CatalogSource;

/// Execute one catalog sync and print what was indexed.
pub async fn execute(args: &SyncArgs) -> Result<()> {
    let config = args.config.load()?;
    let stack = bootstrap::connect(&config)?;

    let source: Arc<dyn CatalogSource> = stack.client.clone();
    let service = CatalogService::new(source, Arc::new(SelectionCache::new()), config.catalog);
    let report = service.sync().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Catalog");
    output::field("Tournaments", report.fetch.tournaments);
    output::field("Events", report.fetch.events);
    output::field("Markets", report.fetch.markets);
    output::field("Lines", report.diagnostics.built(NodeKind::Line));
    output::field("Elapsed", format!("{} ms", report.elapsed_ms));

    output::section("Index");
    output::field("Selections", report.index.selections);
    output::field("Ineligible", report.index.ineligible);
    output::field("Duplicates", report.index.duplicates);

    if args.selections {
        output::section("Selections");
        let index = service.cache().snapshot();
        for record in index.flatten() {
            output::selection_row(record);
        }
    }

    println!();
    if report.fetch.failures > 0 {
        output::warn(&format!(
            "{} listing(s) failed; their subtrees are missing",
            report.fetch.failures
        ));
    }
    let skipped: usize = report.diagnostics.skipped.values().sum();
    if skipped > 0 || report.diagnostics.normalize_failures > 0 {
        output::warn(&format!(
            "{skipped} node(s) skipped, {} market(s) failed to normalize",
            report.diagnostics.normalize_failures
        ));
    }
    output::ok("Catalog synced");
    Ok(())
}

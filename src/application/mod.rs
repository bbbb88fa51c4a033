//! Application services and the catalog pipeline.
//!
//! ```text
//! CatalogSource ──► catalog ──► hierarchy (via normalize) ──► index
//!                                                              │
//!                         wager ◄── lookups ───────────────────┤
//!                         polling ──► enrich ◄── labels ───────┘
//! ```

pub mod catalog;
pub mod config;
pub mod enrich;
pub mod fields;
pub mod hierarchy;
pub mod index;
pub mod normalize;
pub mod polling;
pub mod shutdown;
pub mod wager;

pub use catalog::{CatalogHandle, CatalogService, SyncReport};
pub use enrich::{enrich_orders, EnrichedOrder};
pub use hierarchy::{BuildOptions, HierarchyBuilder, RawCatalog};
pub use index::{IndexStats, SelectionCache, SelectionIndex, SelectionQuery};
pub use polling::{OrderPoller, PollingHandle};
pub use wager::{WagerIntent, WagerService};

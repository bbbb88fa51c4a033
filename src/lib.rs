//! Linebook - sportsbook catalog normalization, selection index and
//! resilient wager client.
//!
//! # Architecture
//!
//! ```text
//! venue REST ──► RequestOrchestrator ──► CatalogService ──► HierarchyBuilder
//!                 (bounded, retried,                          (via normalize)
//!                  single-flight auth)                             │
//!                        ▲                                         ▼
//!                 WagerService / OrderPoller ◄──── SelectionCache (Arc snapshots)
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Venue-agnostic types: ids, odds, catalog tree, wagers
//! - [`application`] - Normalizer, hierarchy builder, index, services
//! - [`port`] - Traits the application depends on (transport, catalog, wagers)
//! - [`adapter`] - reqwest-backed venue implementation of the ports
//! - [`infrastructure`] - Configuration, logging and request orchestration
//! - [`cli`] - Command handlers for the `linebook` binary
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use linebook::application::{HierarchyBuilder, RawCatalog, SelectionCache};
//!
//! let cache = SelectionCache::new();
//! let output = HierarchyBuilder::default().build(&RawCatalog::default());
//! let stats = cache.rebuild(&output.tree);
//! assert_eq!(stats.selections, 0);
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

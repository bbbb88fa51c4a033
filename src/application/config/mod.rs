//! Settings owned by the application services.
//!
//! Deserialized as the `[catalog]` and `[orders]` sections of the
//! infrastructure `Config`.

pub mod catalog;
pub mod orders;

pub use catalog::CatalogConfig;
pub use orders::OrderPollingConfig;

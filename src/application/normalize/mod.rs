//! Shape normalization of a market's selections.
//!
//! Markets publish selections in one of several layouts. Normalization runs
//! in three independent steps:
//!
//! 1. [`shape::detect`] classifies the primary payload into a
//!    [`SelectionShape`](shape::SelectionShape).
//! 2. [`group::build_groups`] turns the shape into line groups;
//!    [`lines::normalize_lines`] does the same for the secondary `lines`
//!    payload.
//! 3. [`merge::merge_groups`] merges both sources by canonical line key and
//!    drops duplicate selections.


pub mod error;
pub mod group;
pub mod lines;
pub mod market;
pub mod merge;
pub mod shape;

pub use error::NormalizeError;
pub use market::{normalize_market, normalize_payloads, NormalizedMarket};
pub use merge::{classify, identity_key, merge_groups};
pub use shape::{detect, SelectionShape};

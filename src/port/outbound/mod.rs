//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the venue's REST surface at two levels: the raw
//! request/response [`transport`] the orchestrator drives, and the typed
//! [`catalog`] and [`wager`] endpoints application services consume.

pub mod auth;
pub mod catalog;
pub mod transport;
pub mod wager;

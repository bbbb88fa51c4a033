//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`] - `ScriptedTransport`, a [`Transport`](crate::port::Transport)
//!   that replays queued responses and records what it was sent.
//! - [`auth`] - `ScriptedAuthenticator` issuing numbered tokens.
//! - [`venue`] - `MockVenue`, an in-memory catalog and wager venue.
//! - [`catalog`] - A small two-event sample catalog.
//! - [`config`] - Canonical test configurations with zero delays.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod transport;
pub mod venue;

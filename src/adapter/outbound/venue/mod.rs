//! Sportsbook venue REST integration.
//!
//! - [`transport`] - reqwest-backed [`Transport`](crate::port::Transport)
//! - [`auth`] - login/refresh over the same transport
//! - [`client`] - typed catalog and wager endpoints through the orchestrator
//! - [`dto`] - wire shapes

pub mod auth;
pub mod client;
pub mod dto;
pub mod transport;

pub use auth::HttpAuthenticator;
pub use client::VenueClient;
pub use transport::HttpTransport;

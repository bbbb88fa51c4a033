//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! catalog logic.
//!
//! - [`bootstrap`] - Wiring of transport, sessions and client from config
//! - [`config`] - Configuration loading, validation and logging setup
//! - [`request`] - Resilient request orchestration over a venue transport

pub mod bootstrap;
pub mod config;
pub mod request;

//! Outbound adapters (driven side).

pub mod venue;

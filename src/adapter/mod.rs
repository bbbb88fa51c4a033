//! Adapters (hexagonal driven side).

pub mod outbound;

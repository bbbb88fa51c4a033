//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Adapters under `adapter::outbound` implement these to reach the venue;
//! the test kit implements them with scripted in-memory fakes.

pub mod outbound;

pub use outbound::auth::{Authenticator, TokenGrant};
pub use outbound::catalog::CatalogSource;
pub use outbound::transport::{ApiRequest, ApiResponse, Method, Transport};
pub use outbound::wager::WagerApi;

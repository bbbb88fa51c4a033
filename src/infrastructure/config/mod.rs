//! Infrastructure configuration modules.

pub mod logging;
pub mod request;
pub mod settings;
pub mod venue;

pub use logging::LoggingConfig;
pub use request::RequestConfig;
pub use settings::Config;
pub use venue::{VenueConfig, VenueCredentials};

pub use crate::application::config::{CatalogConfig, OrderPollingConfig};

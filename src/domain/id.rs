//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a string.")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Tournament (league / competition) identifier.
    TournamentId
);

string_id!(
    /// Event (fixture) identifier.
    EventId
);

string_id!(
    /// Market identifier, unique within the venue.
    MarketId
);

string_id!(
    /// Internal selection identifier as reported in the catalog.
    SelectionId
);

string_id!(
    /// Venue-issued settlement line id.
    ///
    /// Required to place or reference a wager against a specific outcome.
    LineId
);

string_id!(
    /// Venue-issued wager identifier.
    WagerId
);

impl LineId {
    /// Build a line id from raw catalog text, rejecting blank values.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self::new(trimmed))
    }
}

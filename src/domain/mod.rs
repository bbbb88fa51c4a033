//! Venue-agnostic domain types: identifiers, odds, catalog tree, wagers.

pub mod error;
pub mod id;
pub mod odds;
pub mod order;
pub mod selection;
pub mod tree;
pub mod wager;

pub use id::{EventId, LineId, MarketId, SelectionId, TournamentId, WagerId};
pub use odds::{PriceLadder, SignedOdds};
pub use order::{HistoryPage, HistoryQuery, MatchingStatus, OrderRecord, OrderStatus};
pub use selection::{LineKey, LineValue, MarketClass, SelectionGroup, SelectionRecord};
pub use tree::{NodeData, NodeKind, TreeNode};
pub use wager::{CancelRequest, WagerAck, WagerRequest, WagerStrategy};

//! A limit order book matching engine and market replay adapter for
//! Coinbase-style level-3 crypto exchange feeds.
//!
//! The engine ([`orderbook::OrderBook`]) maintains one product under
//! price-time priority and is generic over the price-indexed level map
//! ([`price_levels`]) and the FIFO bucket within each level
//! ([`price_level`]), so the four level-map implementations and two
//! bucket implementations can be mixed and measured without virtual
//! dispatch in the matching loop. [`market::Market`] translates
//! exchange-shaped messages into engine calls and tracks the
//! external-id mapping a real feed requires; [`replay`] models the
//! snapshot/gap/resync contract a feed source must satisfy, as an
//! external collaborator rather than matcher-internal logic.
//!
//! This crate does not implement the historical-data download or
//! reformat pipeline, network ingestion, or persistence — those are
//! out of scope for the matching engine this crate provides.

pub mod error;
pub mod market;
pub mod orderbook;
pub mod price_level;
pub mod price_levels;
pub mod replay;
pub mod types;

pub mod prelude {
    //! Re-exports of the types most callers need.

    pub use crate::error::{MutationOutcome, ReplayError};
    pub use crate::market::{Market, Message, MessageOrderId, MessageType, OrderKind, Reason, Snapshot, SnapshotOrder};
    pub use crate::orderbook::{OrderBook, OrderBookBuilder};
    pub use crate::price_level::PriceLevel;
    pub use crate::price_levels::{AddOrderOutcome, LevelsSnapshot, PriceLevels, Quotes};
    pub use crate::replay::{FileReplaySource, ReplayEvent, ReplaySource};
    pub use crate::types::{
        ExternalOrderId, Order, OrderId, OrderInBook, Price, Side, Size, Trade, EXTERNAL_TRADER_ID,
    };
}

//! `PriceLevels` is the per-side price index: two sorted maps from price
//! to [`crate::price_level::PriceLevel`], one per side, plus best-quote
//! access. Four interchangeable implementations are provided so their
//! performance can be compared (see `SPEC_FULL.md` §4.2): a sorted map, a
//! hand-rolled red-black tree, a hand-rolled AVL tree, and a dense array
//! indexed by `price - min_price`.

mod avl_tree;
mod dense_array;
mod rb_tree;
mod sorted_map;

pub use avl_tree::AvlTreeLevels;
pub use dense_array::DenseArrayLevels;
pub use rb_tree::RbTreeLevels;
pub use sorted_map::SortedMapLevels;

use std::collections::BTreeMap;

use crate::price_level::PriceLevel;
use crate::types::{Order, Price, Side, Size};

/// Result of [`PriceLevels::add_order`]. Carries the handle the caller
/// (the `OrderBook`'s `orders` index) needs to reach the order again in
/// O(1) without a second lookup by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOrderOutcome<H> {
    Inserted { handle: H },
    /// `price` fell outside `[min_price, max_price]`; no level was
    /// created and no order was stored.
    RejectedOutOfRange,
}

/// The 4-tuple `(best_ask, ask_size, best_bid, bid_size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quotes {
    pub ask: Option<Price>,
    pub ask_size: Size,
    pub bid: Option<Price>,
    pub bid_size: Size,
}

/// Per-side map of `price -> total resting size`, covering every
/// non-empty level. Used by `get_snap` and by snapshot round-trip tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelsSnapshot {
    pub bids: BTreeMap<i64, Size>,
    pub asks: BTreeMap<i64, Size>,
}

/// The two sorted price maps and best-quote access for one order book.
pub trait PriceLevels<L: PriceLevel> {
    /// `min_price`/`max_price` bound which prices are acceptable; `None`
    /// on either means unbounded on that side. The dense array variant
    /// requires both to be `Some` (it pre-allocates one slot per tick in
    /// range) and panics at construction otherwise.
    fn new(min_price: Option<Price>, max_price: Option<Price>) -> Self
    where
        Self: Sized;

    /// Looks up the level at `(side, price)`. `None` if absent — callers
    /// on the matching hot path only call this after confirming presence
    /// via `best_bid`/`best_ask`, so the `None` path is cold.
    fn get_level(&self, side: Side, price: Price) -> Option<&L>;

    fn get_level_mut(&mut self, side: Side, price: Price) -> Option<&mut L>;

    /// Inserts `order`, creating its level if needed. Rejects silently
    /// (no level created, no order stored) if `order.price` is outside
    /// the configured bounds.
    fn add_order(&mut self, order: Order) -> AddOrderOutcome<L::Handle>;

    /// Drops the level at `(side, price)` from the side map. Callers
    /// must only call this once the level is empty; no check is made
    /// here (the matcher always empties before removing).
    fn remove_level(&mut self, side: Side, price: Price);

    /// Best ask: the minimum key of the sell map.
    fn best_ask(&self) -> Option<Price>;

    /// Best bid: the maximum key of the buy map.
    fn best_bid(&self) -> Option<Price>;

    fn exist_buy_orders(&self) -> bool {
        self.best_bid().is_some()
    }

    fn exist_sell_orders(&self) -> bool {
        self.best_ask().is_some()
    }

    /// `(best_ask, ask_size_at_best, best_bid, bid_size_at_best)` in one
    /// call, so callers don't pay for two separate best-quote lookups
    /// plus two separate level lookups.
    fn get_quotes(&self) -> Quotes {
        let ask = self.best_ask();
        let bid = self.best_bid();
        Quotes {
            ask,
            ask_size: ask
                .and_then(|p| self.get_level(Side::Sell, p))
                .map(|l| l.total_size())
                .unwrap_or(Size::ZERO),
            bid,
            bid_size: bid
                .and_then(|p| self.get_level(Side::Buy, p))
                .map(|l| l.total_size())
                .unwrap_or(Size::ZERO),
        }
    }

    /// Lazily walks non-empty prices on `side`, best price first
    /// (descending for BUY, ascending for SELL).
    fn get_prices(&self, side: Side) -> Box<dyn Iterator<Item = Price> + '_>;

    /// Per-side map of `price -> total size`, covering all non-empty
    /// levels.
    fn get_snap(&self) -> LevelsSnapshot {
        let mut snap = LevelsSnapshot::default();
        for price in self.get_prices(Side::Buy) {
            if let Some(level) = self.get_level(Side::Buy, price) {
                snap.bids.insert(price.0, level.total_size());
            }
        }
        for price in self.get_prices(Side::Sell) {
            if let Some(level) = self.get_level(Side::Sell, price) {
                snap.asks.insert(price.0, level.total_size());
            }
        }
        snap
    }
}

/// Returns whether `price` is within `[min_price, max_price]`, treating
/// `None` bounds as unbounded on that side.
pub(crate) fn in_range(price: Price, min_price: Option<Price>, max_price: Option<Price>) -> bool {
    min_price.is_none_or(|min| price >= min) && max_price.is_none_or(|max| price <= max)
}

//! The matching engine: owns one side-indexed [`PriceLevels`] plus an
//! `orders` index for O(1) cancel/update, and exposes exactly the four
//! operations named in `SPEC_FULL.md` §4.3 (`limit`, `market_order`,
//! `market_order_funds`, `cancel`/`update`) plus the read-only quote and
//! snapshot accessors.
//!
//! `OrderBook` is generic over both the [`PriceLevels`] implementation
//! and the [`PriceLevel`] bucket implementation so the matching loop is
//! monomorphised end to end — no virtual dispatch sits between a trade
//! and the data structure that produced it (`SPEC_FULL.md` §9).

mod matching;

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::price_level::PriceLevel;
use crate::price_levels::{LevelsSnapshot, PriceLevels, Quotes};
use crate::types::{OrderId, Price, Side};

/// Where a resting order lives: which side, which price, and the handle
/// its `PriceLevel` gave back when it was appended.
struct OrderLocation<H> {
    side: Side,
    price: Price,
    handle: H,
}

/// A limit order book for one product, generic over the price index
/// (`PL`) and FIFO bucket (`L`) implementations it was built with.
pub struct OrderBook<PL: PriceLevels<L>, L: PriceLevel> {
    levels: PL,
    orders: HashMap<OrderId, OrderLocation<L::Handle>>,
    next_order_id: u64,
    tick_size: f64,
    tick_dec: u32,
    multiplier: i64,
}

/// Builds an [`OrderBook`] with an explicit tick size and, optionally,
/// a bounded price range. The dense-array `PriceLevels` variant requires
/// both bounds; the other three accept `None` on either side.
pub struct OrderBookBuilder<PL, L> {
    tick_size: f64,
    min_price: Option<Price>,
    max_price: Option<Price>,
    _levels: PhantomData<PL>,
    _level: PhantomData<L>,
}

impl<PL: PriceLevels<L>, L: PriceLevel> Default for OrderBookBuilder<PL, L> {
    fn default() -> Self {
        OrderBookBuilder {
            tick_size: 0.01,
            min_price: None,
            max_price: None,
            _levels: PhantomData,
            _level: PhantomData,
        }
    }
}

impl<PL: PriceLevels<L>, L: PriceLevel> OrderBookBuilder<PL, L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decimal tick size (default `0.01`). Determines
    /// `tick_dec`/`multiplier` used by [`crate::types::Price`]
    /// float conversions at the market-adapter boundary.
    pub fn tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Bounds accepted prices to `[min_price, max_price]`; orders
    /// outside this range are rejected silently (`SPEC_FULL.md` §4.2).
    pub fn price_bounds(mut self, min_price: Price, max_price: Price) -> Self {
        self.min_price = Some(min_price);
        self.max_price = Some(max_price);
        self
    }

    pub fn build(self) -> OrderBook<PL, L> {
        let tick_dec = (1.0 / self.tick_size).log10().round() as u32;
        let multiplier = 10i64.pow(tick_dec);
        tracing::debug!(
            tick_size = self.tick_size,
            tick_dec,
            multiplier,
            "constructing order book"
        );
        OrderBook {
            levels: PL::new(self.min_price, self.max_price),
            orders: HashMap::new(),
            next_order_id: 0,
            tick_size: self.tick_size,
            tick_dec,
            multiplier,
        }
    }
}

impl<PL: PriceLevels<L>, L: PriceLevel> OrderBook<PL, L> {
    pub fn builder() -> OrderBookBuilder<PL, L> {
        OrderBookBuilder::new()
    }

    /// Convenience constructor using the default `0.01` tick size and
    /// no configured price bounds.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    pub fn tick_dec(&self) -> u32 {
        self.tick_dec
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.levels.best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.levels.best_ask()
    }

    pub fn exist_buy_orders(&self) -> bool {
        self.levels.exist_buy_orders()
    }

    pub fn exist_sell_orders(&self) -> bool {
        self.levels.exist_sell_orders()
    }

    /// `(best_ask, ask_size, best_bid, bid_size)` in one call.
    pub fn get_quotes(&self) -> Quotes {
        self.levels.get_quotes()
    }

    /// Lazily walks non-empty prices on `side`, best price first.
    pub fn get_prices(&self, side: Side) -> Box<dyn Iterator<Item = Price> + '_> {
        self.levels.get_prices(side)
    }

    /// Per-side map of `price -> total resting size`, covering every
    /// non-empty level.
    pub fn get_snap(&self) -> LevelsSnapshot {
        self.levels.get_snap()
    }

    /// Total number of orders currently resting anywhere in the book.
    pub fn resting_order_count(&self) -> usize {
        self.orders.len()
    }

    fn allocate_order_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        OrderId(self.next_order_id)
    }
}

impl<PL: PriceLevels<L>, L: PriceLevel> Default for OrderBook<PL, L> {
    fn default() -> Self {
        Self::new()
    }
}

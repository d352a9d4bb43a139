//! The matching loop itself, plus `cancel`/`update`.
//!
//! `limit` and `market_order` share [`OrderBook::match_against`]: the
//! same FIFO walk, parameterized by whether a price guard stops the walk
//! early (limit) or not (market order) and by whether the aggressor's
//! leftover size rests afterward (limit only). `market_order_funds` has
//! its own loop ([`OrderBook::match_against_funds`]) because it
//! recomputes the quantity to take from `funds / price` at every level,
//! including the exact funds-decrement placement that produces the
//! rounding drift documented in `SPEC_FULL.md` §9.

use tracing::{debug, trace};

use super::{OrderBook, OrderLocation};
use crate::error::MutationOutcome;
use crate::price_level::PriceLevel;
use crate::price_levels::{AddOrderOutcome, PriceLevels};
use crate::types::{Order, OrderId, OrderInBook, Price, Side, Size, Trade};

impl<PL: PriceLevels<L>, L: PriceLevel> OrderBook<PL, L> {
    /// Places a limit order. Matches against the opposite side while it
    /// crosses `price`, then rests any leftover size at `price`.
    ///
    /// Returns the trades generated and, if any size rested,
    /// `Some(OrderInBook)`. Returns `None` for the resting half when the
    /// order fully filled or its residue fell outside the configured
    /// price range (the residue is then dropped silently).
    pub fn limit(
        &mut self,
        price: Price,
        side: Side,
        size: Size,
        trader_id: i64,
        time: impl Into<String>,
    ) -> (Vec<Trade>, Option<OrderInBook>) {
        let time = time.into();
        trace!(%price, %side, %size, trader_id, "limit");
        let (trades, remaining) = self.match_against(side, size, trader_id, &time, Some(price));
        if remaining.is_exhausted() {
            return (trades, None);
        }

        let order_id = self.allocate_order_id();
        let order = Order {
            side,
            price,
            size: remaining,
            trader_id,
            order_id,
        };
        match self.levels.add_order(order) {
            AddOrderOutcome::Inserted { handle } => {
                self.orders.insert(
                    order_id,
                    OrderLocation {
                        side,
                        price,
                        handle,
                    },
                );
                (
                    trades,
                    Some(OrderInBook {
                        order_id,
                        remaining_size: remaining,
                        side,
                        price,
                    }),
                )
            }
            AddOrderOutcome::RejectedOutOfRange => {
                debug!(%price, %side, "limit: residue out of range, dropped silently");
                (trades, None)
            }
        }
    }

    /// A size-denominated market order: same FIFO walk as `limit`, but
    /// without a price guard and without resting the leftover — an
    /// exhausted opposite side simply discards the remainder. The
    /// caller is responsible for reporting partial fills.
    pub fn market_order(
        &mut self,
        size: Size,
        side: Side,
        trader_id: i64,
        time: impl Into<String>,
    ) -> Vec<Trade> {
        let time = time.into();
        trace!(%size, %side, trader_id, "market_order");
        let (trades, _residue) = self.match_against(side, size, trader_id, &time, None);
        trades
    }

    /// A funds (notional)-denominated market order. Preserves the
    /// reference implementation's exact rounding behaviour: `funds` is
    /// only decremented when a head order is fully consumed but the
    /// running size hasn't reached zero yet; a partial fill returns
    /// immediately without touching `funds` at all. See `SPEC_FULL.md`
    /// §9 — this is deliberate, not a bug.
    pub fn market_order_funds(
        &mut self,
        funds: f64,
        side: Side,
        trader_id: i64,
        time: impl Into<String>,
    ) -> Vec<Trade> {
        let time = time.into();
        trace!(funds, %side, trader_id, "market_order_funds");
        self.match_against_funds(side, funds, trader_id, &time)
    }

    /// Cancels a resting order. Unknown ids are a benign no-op
    /// (`SPEC_FULL.md` §7/§9): logged at `debug`, not surfaced as an
    /// error.
    pub fn cancel(&mut self, order_id: OrderId) -> MutationOutcome {
        let Some(location) = self.orders.remove(&order_id) else {
            debug!(%order_id, "cancel: unknown order id, no-op");
            return MutationOutcome::NotFound;
        };
        if let Some(level) = self.levels.get_level_mut(location.side, location.price) {
            level.remove(location.handle);
            if level.is_empty() {
                self.levels.remove_level(location.side, location.price);
            }
        }
        MutationOutcome::Applied
    }

    /// Resizes a resting order in place. Priority is preserved — this
    /// is not a cancel/replace, matching Coinbase's `change` semantics
    /// and `SPEC_FULL.md` §9's first open-question resolution. Unknown
    /// ids are a benign no-op, same as `cancel`.
    pub fn update(&mut self, order_id: OrderId, new_size: Size) -> MutationOutcome {
        let Some(location) = self.orders.get(&order_id) else {
            debug!(%order_id, "update: unknown order id, no-op");
            return MutationOutcome::NotFound;
        };
        let Some(level) = self.levels.get_level_mut(location.side, location.price) else {
            debug!(%order_id, "update: order indexed but its level is missing, no-op");
            return MutationOutcome::NotFound;
        };
        let Some(current) = level.get(location.handle) else {
            debug!(%order_id, "update: order indexed but not found in its level, no-op");
            return MutationOutcome::NotFound;
        };
        let delta = Size(new_size.0 - current.size.0);
        level.update(location.handle, delta);
        MutationOutcome::Applied
    }

    /// Shared FIFO walk for `limit` and `market_order`. `price_limit`,
    /// when set, stops the walk once the opposite side no longer
    /// crosses it; when `None`, the walk continues until `size` is
    /// exhausted or the opposite side empties. Returns the trades
    /// produced and whatever size is left over (zero unless a price
    /// guard or an empty opposite side stopped the walk early).
    fn match_against(
        &mut self,
        side: Side,
        mut size: Size,
        trader_id: i64,
        time: &str,
        price_limit: Option<Price>,
    ) -> (Vec<Trade>, Size) {
        let opposite = side.opposite();
        let mut trades = Vec::new();

        'outer: while !size.is_exhausted() {
            let best_price = match opposite {
                Side::Sell => self.levels.best_ask(),
                Side::Buy => self.levels.best_bid(),
            };
            let Some(best_price) = best_price else {
                break;
            };
            if let Some(limit) = price_limit {
                let crosses = match side {
                    Side::Buy => best_price <= limit,
                    Side::Sell => best_price >= limit,
                };
                if !crosses {
                    break;
                }
            }

            loop {
                let Some(handle) = self
                    .levels
                    .get_level(opposite, best_price)
                    .and_then(|level| level.first_handle())
                else {
                    // Level exhausted without satisfying `size`; recompute
                    // the best price on the outer loop.
                    break;
                };
                let head = self
                    .levels
                    .get_level(opposite, best_price)
                    .and_then(|level| level.get(handle))
                    .expect("handle just obtained from first_handle")
                    .clone();

                if size < head.size {
                    let level = self
                        .levels
                        .get_level_mut(opposite, best_price)
                        .expect("level present for best_price");
                    level.update(handle, Size(-size.0));
                    trades.push(Trade {
                        taker_trader_id: trader_id,
                        maker_trader_id: head.trader_id,
                        price: best_price,
                        size,
                        maker_order_id: head.order_id,
                        taker_side: side,
                        time: time.to_string(),
                    });
                    size = Size::ZERO;
                    break 'outer;
                }

                let level = self
                    .levels
                    .get_level_mut(opposite, best_price)
                    .expect("level present for best_price");
                level.remove_first();
                self.orders.remove(&head.order_id);
                let now_empty = level.is_empty();
                if now_empty {
                    self.levels.remove_level(opposite, best_price);
                }
                size -= head.size;
                trades.push(Trade {
                    taker_trader_id: trader_id,
                    maker_trader_id: head.trader_id,
                    price: best_price,
                    size: head.size,
                    maker_order_id: head.order_id,
                    taker_side: side,
                    time: time.to_string(),
                });
                if size.is_exhausted() {
                    break 'outer;
                }
                if now_empty {
                    break;
                }
            }
        }

        (trades, size)
    }

    /// The `market_order_funds` loop. See the type-level doc comment on
    /// this module for why the funds decrement sits where it does.
    fn match_against_funds(
        &mut self,
        side: Side,
        mut funds: f64,
        trader_id: i64,
        time: &str,
    ) -> Vec<Trade> {
        let opposite = side.opposite();
        let mut trades = Vec::new();

        while funds > crate::types::SIZE_EPSILON {
            let best_price = match opposite {
                Side::Sell => self.levels.best_ask(),
                Side::Buy => self.levels.best_bid(),
            };
            let Some(best_price) = best_price else {
                break;
            };
            let price_ticks = best_price.0 as f64;
            let mut size = funds / price_ticks;

            loop {
                let Some(handle) = self
                    .levels
                    .get_level(opposite, best_price)
                    .and_then(|level| level.first_handle())
                else {
                    break;
                };
                let head = self
                    .levels
                    .get_level(opposite, best_price)
                    .and_then(|level| level.get(handle))
                    .expect("handle just obtained from first_handle")
                    .clone();
                let h = head.size.0;

                if size < h {
                    let level = self
                        .levels
                        .get_level_mut(opposite, best_price)
                        .expect("level present for best_price");
                    level.update(handle, Size(-size));
                    trades.push(Trade {
                        taker_trader_id: trader_id,
                        maker_trader_id: head.trader_id,
                        price: best_price,
                        size: Size(size),
                        maker_order_id: head.order_id,
                        taker_side: side,
                        time: time.to_string(),
                    });
                    // Matches the source exactly: funds is not updated
                    // on a partial fill because the caller never reads
                    // it again after this return.
                    return trades;
                }

                let level = self
                    .levels
                    .get_level_mut(opposite, best_price)
                    .expect("level present for best_price");
                level.remove_first();
                self.orders.remove(&head.order_id);
                let now_empty = level.is_empty();
                if now_empty {
                    self.levels.remove_level(opposite, best_price);
                }
                size -= h;
                trades.push(Trade {
                    taker_trader_id: trader_id,
                    maker_trader_id: head.trader_id,
                    price: best_price,
                    size: Size(h),
                    maker_order_id: head.order_id,
                    taker_side: side,
                    time: time.to_string(),
                });
                if size <= crate::types::SIZE_EPSILON {
                    return trades;
                }
                funds -= h * price_ticks;
                if now_empty {
                    break;
                }
            }
        }

        trades
    }
}

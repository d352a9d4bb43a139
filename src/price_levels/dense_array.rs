//! Dense-array variant of [`PriceLevels`] — the performance target for
//! real-world crypto books where tick grids are dense and price
//! excursions are bounded.
//!
//! Grounded in the reference implementation's `ListPriceLevels`: one
//! `Vec<L>` sized to the whole configured price range, indexed by
//! `price - min_price`, with `bid_index`/`ask_index` cursors that only
//! advance when a new price is at least as aggressive as the current
//! pointer, and that walk outward over empty slots after a removal.
//! Both sides share one array — a single price slot never holds resting
//! orders on both sides at once in a well-formed book, so there is no
//! need for two arrays.

use super::{in_range, AddOrderOutcome, PriceLevels};
use crate::price_level::PriceLevel;
use crate::types::{Order, Price, Side};

pub struct DenseArrayLevels<L: PriceLevel> {
    levels: Vec<L>,
    min_price: Price,
    max_price: Price,
    /// Index of the best bid. Starts at 0 (the low end of the range)
    /// and only ever moves up to a more aggressive (higher) price.
    bid_index: usize,
    /// Index of the best ask. Starts at `max_index` (the high end of
    /// the range) and only ever moves down to a more aggressive
    /// (lower) price.
    ask_index: usize,
}

impl<L: PriceLevel> DenseArrayLevels<L> {
    fn max_index(&self) -> usize {
        self.levels.len() - 1
    }

    fn price_index(&self, price: Price) -> usize {
        (price.0 - self.min_price.0) as usize
    }

    fn price_at(&self, index: usize) -> Price {
        Price(index as i64 + self.min_price.0)
    }
}

impl<L: PriceLevel> PriceLevels<L> for DenseArrayLevels<L> {
    fn new(min_price: Option<Price>, max_price: Option<Price>) -> Self {
        let min_price = min_price.expect("DenseArrayLevels requires a configured min_price");
        let max_price = max_price.expect("DenseArrayLevels requires a configured max_price");
        let max_index = (max_price.0 - min_price.0) as usize;
        let levels = (0..=max_index)
            .map(|i| L::new(Price(i as i64 + min_price.0)))
            .collect();
        DenseArrayLevels {
            levels,
            min_price,
            max_price,
            bid_index: 0,
            ask_index: max_index,
        }
    }

    fn get_level(&self, _side: Side, price: Price) -> Option<&L> {
        if !in_range(price, Some(self.min_price), Some(self.max_price)) {
            return None;
        }
        let level = &self.levels[self.price_index(price)];
        if level.is_empty() { None } else { Some(level) }
    }

    fn get_level_mut(&mut self, _side: Side, price: Price) -> Option<&mut L> {
        if !in_range(price, Some(self.min_price), Some(self.max_price)) {
            return None;
        }
        let index = self.price_index(price);
        let level = &mut self.levels[index];
        if level.is_empty() { None } else { Some(level) }
    }

    fn add_order(&mut self, order: Order) -> AddOrderOutcome<L::Handle> {
        if !in_range(order.price, Some(self.min_price), Some(self.max_price)) {
            return AddOrderOutcome::RejectedOutOfRange;
        }
        let index = self.price_index(order.price);
        let side = order.side;
        let handle = self.levels[index].append(order);
        match side {
            Side::Buy => {
                if index >= self.bid_index {
                    self.bid_index = index;
                }
            }
            Side::Sell => {
                if index <= self.ask_index {
                    self.ask_index = index;
                }
            }
        }
        AddOrderOutcome::Inserted { handle }
    }

    fn remove_level(&mut self, side: Side, price: Price) {
        let index = self.price_index(price);
        self.levels[index] = L::new(price);
        let max_index = self.max_index();
        match side {
            Side::Buy => {
                while self.bid_index > 0 && self.levels[self.bid_index].is_empty() {
                    self.bid_index -= 1;
                }
            }
            Side::Sell => {
                while self.ask_index < max_index && self.levels[self.ask_index].is_empty() {
                    self.ask_index += 1;
                }
            }
        }
    }

    fn best_ask(&self) -> Option<Price> {
        if self.levels[self.ask_index].is_empty() {
            None
        } else {
            Some(self.price_at(self.ask_index))
        }
    }

    fn best_bid(&self) -> Option<Price> {
        if self.levels[self.bid_index].is_empty() {
            None
        } else {
            Some(self.price_at(self.bid_index))
        }
    }

    fn get_prices(&self, side: Side) -> Box<dyn Iterator<Item = Price> + '_> {
        match side {
            Side::Buy => Box::new(
                (0..=self.bid_index)
                    .rev()
                    .filter(move |&i| !self.levels[i].is_empty())
                    .map(move |i| self.price_at(i)),
            ),
            Side::Sell => Box::new(
                (self.ask_index..=self.max_index())
                    .filter(move |&i| !self.levels[i].is_empty())
                    .map(move |i| self.price_at(i)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_level::OrderedMapLevel;
    use crate::types::{OrderId, Size, EXTERNAL_TRADER_ID};

    fn order(id: u64, side: Side, price: i64, size: f64) -> Order {
        Order {
            side,
            price: Price(price),
            size: Size(size),
            trader_id: EXTERNAL_TRADER_ID,
            order_id: OrderId(id),
        }
    }

    fn fresh() -> DenseArrayLevels<OrderedMapLevel> {
        DenseArrayLevels::new(Some(Price(9900)), Some(Price(10100)))
    }

    #[test]
    fn pointer_only_advances_toward_the_more_aggressive_price() {
        let mut levels = fresh();
        levels.add_order(order(1, Side::Buy, 10000, 1.0));
        assert_eq!(levels.best_bid(), Some(Price(10000)));
        // A less aggressive (lower) bid must not move the pointer.
        levels.add_order(order(2, Side::Buy, 9950, 1.0));
        assert_eq!(levels.best_bid(), Some(Price(10000)));
        // A more aggressive (higher) bid does move it.
        levels.add_order(order(3, Side::Buy, 10050, 1.0));
        assert_eq!(levels.best_bid(), Some(Price(10050)));
    }

    #[test]
    fn removing_the_best_level_advances_the_pointer_over_empty_slots() {
        let mut levels = fresh();
        levels.add_order(order(1, Side::Sell, 10000, 1.0));
        levels.add_order(order(2, Side::Sell, 10010, 1.0));
        assert_eq!(levels.best_ask(), Some(Price(10000)));
        levels.remove_level(Side::Sell, Price(10000));
        assert_eq!(levels.best_ask(), Some(Price(10010)));
    }

    #[test]
    fn out_of_range_price_is_rejected() {
        let mut levels = fresh();
        let outcome = levels.add_order(order(1, Side::Buy, 20000, 1.0));
        assert_eq!(outcome, AddOrderOutcome::RejectedOutOfRange);
    }

    #[test]
    fn empty_book_has_no_best_bid_or_ask() {
        let levels = fresh();
        assert_eq!(levels.best_bid(), None);
        assert_eq!(levels.best_ask(), None);
    }
}

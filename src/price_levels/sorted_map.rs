//! Sorted-map variant of [`PriceLevels`], backed by `BTreeMap<i64, L>`.
//!
//! Grounded in the reference implementation's `SortedDictPriceLevels`
//! (Python's `SortedDict`): O(log n) insert/delete and O(log n) (here,
//! O(1) amortized thanks to `BTreeMap`'s cached edge access)
//! best-quote lookup.

use std::collections::BTreeMap;

use super::{in_range, AddOrderOutcome, PriceLevels};
use crate::price_level::PriceLevel;
use crate::types::{Order, Price, Side};

pub struct SortedMapLevels<L: PriceLevel> {
    bids: BTreeMap<i64, L>,
    asks: BTreeMap<i64, L>,
    min_price: Option<Price>,
    max_price: Option<Price>,
}

impl<L: PriceLevel> SortedMapLevels<L> {
    fn side_map(&self, side: Side) -> &BTreeMap<i64, L> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_map_mut(&mut self, side: Side) -> &mut BTreeMap<i64, L> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

impl<L: PriceLevel> PriceLevels<L> for SortedMapLevels<L> {
    fn new(min_price: Option<Price>, max_price: Option<Price>) -> Self {
        SortedMapLevels {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            min_price,
            max_price,
        }
    }

    fn get_level(&self, side: Side, price: Price) -> Option<&L> {
        self.side_map(side).get(&price.0)
    }

    fn get_level_mut(&mut self, side: Side, price: Price) -> Option<&mut L> {
        self.side_map_mut(side).get_mut(&price.0)
    }

    fn add_order(&mut self, order: Order) -> AddOrderOutcome<L::Handle> {
        if !in_range(order.price, self.min_price, self.max_price) {
            return AddOrderOutcome::RejectedOutOfRange;
        }
        let (side, price) = (order.side, order.price);
        let level = self
            .side_map_mut(side)
            .entry(price.0)
            .or_insert_with(|| L::new(price));
        let handle = level.append(order);
        AddOrderOutcome::Inserted { handle }
    }

    fn remove_level(&mut self, side: Side, price: Price) {
        self.side_map_mut(side).remove(&price.0);
    }

    fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().map(|&p| Price(p))
    }

    fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().map(|&p| Price(p))
    }

    fn get_prices(&self, side: Side) -> Box<dyn Iterator<Item = Price> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.keys().rev().map(|&p| Price(p))),
            Side::Sell => Box::new(self.asks.keys().map(|&p| Price(p))),
        }
    }
}

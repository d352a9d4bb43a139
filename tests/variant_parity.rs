//! The same FIFO/crossing/cancel behaviour must hold identically across
//! every `PriceLevels` x `PriceLevel` combination the engine supports
//! (`spec.md` §9: "the engine's performance story is the ability to
//! swap implementations" — swapping must never change matching
//! semantics). One macro instantiates the same test body against all
//! eight combinations.

use lobsim::prelude::*;
use lobsim::price_level::{DequeLevel, OrderedMapLevel};
use lobsim::price_levels::{AvlTreeLevels, DenseArrayLevels, RbTreeLevels, SortedMapLevels};

fn bounded_book<PL: PriceLevels<L>, L: PriceLevel>() -> OrderBook<PL, L> {
    OrderBook::builder()
        .tick_size(0.01)
        .price_bounds(Price(1), Price(1_000_000))
        .build()
}

fn fifo_priority_is_preserved<PL: PriceLevels<L>, L: PriceLevel>() {
    let mut book = bounded_book::<PL, L>();
    let (_, a) = book.limit(Price(10000), Side::Buy, Size(1.0), 1, "t");
    let (_, b) = book.limit(Price(10000), Side::Buy, Size(1.0), 2, "t");
    let (_, c) = book.limit(Price(10000), Side::Buy, Size(1.0), 3, "t");
    let ids = [a.unwrap().order_id, b.unwrap().order_id, c.unwrap().order_id];

    for expected in ids {
        let trades = book.market_order(Size(1.0), Side::Sell, 99, "t");
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].maker_order_id, expected);
    }
}

fn crossing_then_resting_never_leaves_a_crossed_book<PL: PriceLevels<L>, L: PriceLevel>() {
    let mut book = bounded_book::<PL, L>();
    book.limit(Price(9900), Side::Sell, Size(1.0), 1, "t");
    let (trades, resting) = book.limit(Price(10000), Side::Buy, Size(2.0), 2, "t");
    assert_eq!(trades.len(), 1);
    let resting = resting.expect("residual 1.0 should rest");
    assert_eq!(resting.remaining_size, Size(1.0));

    let quotes = book.get_quotes();
    if let (Some(bid), Some(ask)) = (quotes.bid, quotes.ask) {
        assert!(bid < ask, "book must not remain crossed after limit returns");
    }
}

fn cancel_removes_the_level_when_it_empties<PL: PriceLevels<L>, L: PriceLevel>() {
    let mut book = bounded_book::<PL, L>();
    let (_, resting) = book.limit(Price(10000), Side::Buy, Size(1.0), 1, "t");
    let id = resting.unwrap().order_id;
    assert_eq!(book.get_quotes().bid, Some(Price(10000)));
    book.cancel(id);
    assert_eq!(book.get_quotes().bid, None);
    assert!(book.get_prices(Side::Buy).next().is_none());
}

fn update_resizes_without_moving_priority<PL: PriceLevels<L>, L: PriceLevel>() {
    let mut book = bounded_book::<PL, L>();
    let (_, a) = book.limit(Price(10000), Side::Buy, Size(1.0), 1, "t");
    let (_, b) = book.limit(Price(10000), Side::Buy, Size(1.0), 2, "t");
    let a_id = a.unwrap().order_id;
    let b_id = b.unwrap().order_id;

    book.update(a_id, Size(4.0));
    assert_eq!(book.get_snap().bids.get(&10000), Some(&Size(5.0)));

    // a_id grew but must still be served first.
    let trades = book.market_order(Size(4.0), Side::Sell, 9, "t");
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].maker_order_id, a_id);
    assert_eq!(trades[0].size, Size(4.0));

    let trades = book.market_order(Size(1.0), Side::Sell, 9, "t");
    assert_eq!(trades[0].maker_order_id, b_id);
}

macro_rules! variant_tests {
    ($mod_name:ident, $pl:ty, $l:ty) => {
        mod $mod_name {
            use super::*;

            #[test]
            fn fifo_priority_is_preserved() {
                super::fifo_priority_is_preserved::<$pl, $l>();
            }

            #[test]
            fn crossing_then_resting_never_leaves_a_crossed_book() {
                super::crossing_then_resting_never_leaves_a_crossed_book::<$pl, $l>();
            }

            #[test]
            fn cancel_removes_the_level_when_it_empties() {
                super::cancel_removes_the_level_when_it_empties::<$pl, $l>();
            }

            #[test]
            fn update_resizes_without_moving_priority() {
                super::update_resizes_without_moving_priority::<$pl, $l>();
            }
        }
    };
}

variant_tests!(sorted_map_ordered_map, SortedMapLevels<OrderedMapLevel>, OrderedMapLevel);
variant_tests!(sorted_map_deque, SortedMapLevels<DequeLevel>, DequeLevel);
variant_tests!(rb_tree_ordered_map, RbTreeLevels<OrderedMapLevel>, OrderedMapLevel);
variant_tests!(rb_tree_deque, RbTreeLevels<DequeLevel>, DequeLevel);
variant_tests!(avl_tree_ordered_map, AvlTreeLevels<OrderedMapLevel>, OrderedMapLevel);
variant_tests!(avl_tree_deque, AvlTreeLevels<DequeLevel>, DequeLevel);
variant_tests!(dense_array_ordered_map, DenseArrayLevels<OrderedMapLevel>, OrderedMapLevel);
variant_tests!(dense_array_deque, DenseArrayLevels<DequeLevel>, DequeLevel);

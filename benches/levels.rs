//! Compares the four [`PriceLevels`] implementations crossed with the
//! two [`PriceLevel`] bucket implementations under the same synthetic
//! workloads, grounded in the teacher's `benches/order_book/
//! mass_cancel.rs` pattern (one `criterion_group`/benchmark-group per
//! workload, `bench_with_input` over a size axis, `iter_with_setup` to
//! keep population cost out of the timed region).
//!
//! Structural only: no throughput numbers are written into doc comments
//! here, since this crate has none of its own yet to report honestly.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lobsim::prelude::*;
use lobsim::price_level::{DequeLevel, OrderedMapLevel};
use lobsim::price_levels::{AvlTreeLevels, DenseArrayLevels, RbTreeLevels, SortedMapLevels};

const TICK_SIZE: f64 = 0.01;
const MIN_PRICE: i64 = 1;
const MAX_PRICE: i64 = 2_000_000;

fn build_book<PL, L>() -> OrderBook<PL, L>
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    OrderBook::builder()
        .tick_size(TICK_SIZE)
        .price_bounds(Price(MIN_PRICE), Price(MAX_PRICE))
        .build()
}

fn populate<PL, L>(book: &mut OrderBook<PL, L>, count: usize) -> Vec<OrderId>
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let price = Price(1_000 + (i % 10_000) as i64);
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let (_trades, resting) = book.limit(price, side, Size(10.0), 1, "t");
        if let Some(oib) = resting {
            ids.push(oib.order_id);
        }
    }
    ids
}

fn bench_add_heavy<PL, L>(c: &mut Criterion, label: &str)
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    let mut group = c.benchmark_group(format!("add_heavy/{label}"));
    for &count in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("limit_rest", count), &count, |b, &count| {
            b.iter_with_setup(
                || build_book::<PL, L>(),
                |mut book| {
                    let ids = black_box(populate(&mut book, count));
                    black_box(ids);
                },
            );
        });
    }
    group.finish();
}

fn bench_cancel_heavy<PL, L>(c: &mut Criterion, label: &str)
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    let mut group = c.benchmark_group(format!("cancel_heavy/{label}"));
    for &count in &[100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("cancel_all", count), &count, |b, &count| {
            b.iter_with_setup(
                || {
                    let mut book = build_book::<PL, L>();
                    let ids = populate(&mut book, count);
                    (book, ids)
                },
                |(mut book, ids)| {
                    for id in ids {
                        black_box(book.cancel(id));
                    }
                },
            );
        });
    }
    group.finish();
}

fn bench_aggressive_walk<PL, L>(c: &mut Criterion, label: &str)
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    let mut group = c.benchmark_group(format!("aggressive_walk/{label}"));
    for &depth in &[10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("market_order_sweep", depth), &depth, |b, &depth| {
            b.iter_with_setup(
                || {
                    let mut book = build_book::<PL, L>();
                    for i in 0..depth {
                        book.limit(Price(1_000 + i as i64), Side::Sell, Size(1.0), 1, "t");
                    }
                    book
                },
                |mut book| {
                    black_box(book.market_order(Size(depth as f64), Side::Buy, 2, "t"));
                },
            );
        });
    }
    group.finish();
}

fn bench_mixed<PL, L>(c: &mut Criterion, label: &str)
where
    PL: PriceLevels<L>,
    L: PriceLevel,
{
    let mut group = c.benchmark_group(format!("mixed_70_20_10/{label}"));
    for &count in &[1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("limit_cancel_market", count), &count, |b, &count| {
            b.iter_with_setup(
                || {
                    let mut book = build_book::<PL, L>();
                    let ids = populate(&mut book, count);
                    (book, ids)
                },
                |(mut book, ids)| {
                    for (i, id) in ids.iter().enumerate() {
                        match i % 10 {
                            0..=6 => {
                                let price = Price(1_000 + (i % 10_000) as i64);
                                let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                                black_box(book.limit(price, side, Size(5.0), 1, "t"));
                            }
                            7..=8 => {
                                black_box(book.cancel(*id));
                            }
                            _ => {
                                black_box(book.market_order(Size(1.0), Side::Buy, 2, "t"));
                            }
                        }
                    }
                },
            );
        });
    }
    group.finish();
}

macro_rules! register_variant {
    ($c:expr, $pl:ty, $l:ty, $label:expr) => {
        bench_add_heavy::<$pl, $l>($c, $label);
        bench_cancel_heavy::<$pl, $l>($c, $label);
        bench_aggressive_walk::<$pl, $l>($c, $label);
        bench_mixed::<$pl, $l>($c, $label);
    };
}

fn register_benchmarks(c: &mut Criterion) {
    register_variant!(c, SortedMapLevels<OrderedMapLevel>, OrderedMapLevel, "sorted_map+ordered_map");
    register_variant!(c, SortedMapLevels<DequeLevel>, DequeLevel, "sorted_map+deque");
    register_variant!(c, RbTreeLevels<OrderedMapLevel>, OrderedMapLevel, "rb_tree+ordered_map");
    register_variant!(c, RbTreeLevels<DequeLevel>, DequeLevel, "rb_tree+deque");
    register_variant!(c, AvlTreeLevels<OrderedMapLevel>, OrderedMapLevel, "avl_tree+ordered_map");
    register_variant!(c, AvlTreeLevels<DequeLevel>, DequeLevel, "avl_tree+deque");
    register_variant!(c, DenseArrayLevels<OrderedMapLevel>, OrderedMapLevel, "dense_array+ordered_map");
    register_variant!(c, DenseArrayLevels<DequeLevel>, DequeLevel, "dense_array+deque");
}

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);

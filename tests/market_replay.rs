//! Integration tests for [`lobsim::market::Market`]: the L3 message
//! dispatch table (`spec.md` §4.4) and the snapshot loader, exercised
//! through `Message` constructors rather than hand-built structs so the
//! tests read like a miniature feed.

use lobsim::prelude::*;
use lobsim::price_level::DequeLevel;
use lobsim::price_levels::SortedMapLevels;

type TestMarket = Market<SortedMapLevels<DequeLevel>, DequeLevel>;

fn market() -> TestMarket {
    Market::new(OrderBook::builder().tick_size(0.01).build())
}

#[test]
fn external_received_limit_rests_and_records_the_id_mapping() {
    let mut market = market();
    let msg = Message::received_limit(
        Side::Buy,
        100.00,
        Size(1.0),
        EXTERNAL_TRADER_ID,
        Some(MessageOrderId::External(ExternalOrderId::from("coinbase-abc"))),
        "2024-01-01T00:00:00Z",
    );
    let trades = market.send_message(&msg, true);
    assert!(trades.is_empty());
    assert_eq!(market.book().get_quotes().bid, Some(Price(10000)));

    // A later `done canceled` referencing the same exchange id must
    // resolve through the map and actually cancel the resting order.
    let cancel_msg = Message::done_canceled(
        Side::Buy,
        MessageOrderId::External(ExternalOrderId::from("coinbase-abc")),
        EXTERNAL_TRADER_ID,
        "2024-01-01T00:00:01Z",
    );
    market.send_message(&cancel_msg, true);
    assert_eq!(market.book().get_quotes().bid, None);
}

#[test]
fn done_canceled_with_unknown_external_id_is_a_silent_no_op() {
    let mut market = market();
    market.send_message(
        &Message::received_limit(Side::Buy, 100.00, Size(1.0), EXTERNAL_TRADER_ID, None, "t0"),
        true,
    );
    let cancel_msg = Message::done_canceled(
        Side::Buy,
        MessageOrderId::External(ExternalOrderId::from("never-seen")),
        EXTERNAL_TRADER_ID,
        "t1",
    );
    market.send_message(&cancel_msg, true);
    // The resting order placed above (never referenced by the cancel)
    // is untouched.
    assert_eq!(market.book().get_quotes().bid, Some(Price(10000)));
}

#[test]
fn change_resizes_the_external_order_without_removing_the_mapping() {
    let mut market = market();
    market.send_message(
        &Message::received_limit(
            Side::Buy,
            100.00,
            Size(1.0),
            EXTERNAL_TRADER_ID,
            Some(MessageOrderId::External(ExternalOrderId::from("ext-1"))),
            "t0",
        ),
        true,
    );
    market.send_message(
        &Message::change(
            Side::Buy,
            MessageOrderId::External(ExternalOrderId::from("ext-1")),
            Size(0.4),
            EXTERNAL_TRADER_ID,
            "t1",
        ),
        true,
    );
    assert_eq!(market.book().get_snap().bids.get(&10000), Some(&Size(0.4)));

    // the mapping is still live (change does not pop it): a later
    // cancel must still resolve it.
    market.send_message(
        &Message::done_canceled(
            Side::Buy,
            MessageOrderId::External(ExternalOrderId::from("ext-1")),
            EXTERNAL_TRADER_ID,
            "t2",
        ),
        true,
    );
    assert_eq!(market.book().get_quotes().bid, None);
}

#[test]
fn received_market_with_size_dispatches_to_size_denominated_match() {
    let mut market = market();
    market.send_message(
        &Message::received_limit(Side::Sell, 100.00, Size(1.0), 1, None, "t0"),
        false,
    );
    let trades = market.send_message(
        &Message::received_market_size(Side::Buy, Size(1.0), 2, "t1"),
        false,
    );
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].size, Size(1.0));
}

#[test]
fn received_market_with_funds_scales_by_the_tick_multiplier() {
    let mut market = market();
    market.send_message(
        &Message::received_limit(Side::Sell, 100.00, Size(1.0), 1, None, "t0"),
        false,
    );
    // funds = 50.0 (raw, pre-multiplier); at multiplier=100 and price
    // 100.00 ticks=10000, 50.0*100/10000 = 0.5 of size filled.
    let trades = market.send_message(
        &Message::received_market_funds(Side::Buy, 50.0, 2, "t1"),
        false,
    );
    assert_eq!(trades.len(), 1);
    assert!((trades[0].size.0 - 0.5).abs() < 1e-9);
}

#[test]
fn fill_snap_round_trips_up_to_aggregation_by_price() {
    let mut market = market();
    let snapshot = Snapshot {
        sequence: 1,
        bids: vec![
            SnapshotOrder {
                side: Side::Buy,
                price: 100.00,
                size: Size(1.0),
                external_id: ExternalOrderId::from("b1"),
            },
            SnapshotOrder {
                side: Side::Buy,
                price: 100.00,
                size: Size(2.0),
                external_id: ExternalOrderId::from("b2"),
            },
            SnapshotOrder {
                side: Side::Buy,
                price: 99.50,
                size: Size(0.5),
                external_id: ExternalOrderId::from("b3"),
            },
        ],
        asks: vec![SnapshotOrder {
            side: Side::Sell,
            price: 100.50,
            size: Size(3.0),
            external_id: ExternalOrderId::from("a1"),
        }],
    };
    market.fill_snap(&snapshot);

    let snap = market.book().get_snap();
    assert_eq!(snap.bids.get(&10000), Some(&Size(3.0)));
    assert_eq!(snap.bids.get(&9950), Some(&Size(0.5)));
    assert_eq!(snap.asks.get(&10050), Some(&Size(3.0)));

    // Both resting orders at 100.00 are individually cancellable via
    // their external ids — the aggregation is a view, not a merge.
    market.send_message(
        &Message::done_canceled(Side::Buy, MessageOrderId::External(ExternalOrderId::from("b1")), -1, "t"),
        true,
    );
    assert_eq!(market.book().get_snap().bids.get(&10000), Some(&Size(2.0)));
}

//! Translates exchange-style L3 messages into calls against an
//! [`OrderBook`], and maintains the `ExternalOrderId -> OrderId` mapping
//! so a caller can reference orders by the exchange's own id.
//!
//! Grounded in the reference implementation's `ExternalMarket`
//! (`market.py`): the dispatch table in [`Market::send_message`] and
//! the snapshot loader in [`Market::fill_snap`] mirror it line for line,
//! including the asymmetry between `done canceled` (pops the external-id
//! map) and `change` (looks it up without removing).

mod message;

pub use message::{Message, MessageOrderId, MessageType, OrderKind, Reason, Snapshot, SnapshotOrder};

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::price_level::PriceLevel;
use crate::price_levels::PriceLevels;
use crate::orderbook::OrderBook;
use crate::types::{ExternalOrderId, OrderId, Price, Side, Size, Trade, EXTERNAL_TRADER_ID};

/// Default market time before any external message has been observed,
/// matching the source's literal `self.time = '2000-1-1 00:00'`.
const INITIAL_TIME: &str = "2000-1-1 00:00";

/// Wraps an [`OrderBook`] and the external/internal id mapping needed to
/// replay an exchange feed against it.
pub struct Market<PL: PriceLevels<L>, L: PriceLevel> {
    book: OrderBook<PL, L>,
    /// `external_order_ids`: exchange-assigned id -> engine-assigned id.
    /// An exchange id is present iff the corresponding order is still
    /// resting (`SPEC_FULL.md` §3 Market invariant).
    external_order_ids: HashMap<ExternalOrderId, OrderId>,
    /// The market's own notion of wall-clock time, updated only by
    /// external messages (`ExternalMarket.time` in the source). Used as
    /// the trade timestamp for `fill_snap`, which carries no time of
    /// its own.
    time: String,
}

impl<PL: PriceLevels<L>, L: PriceLevel> Market<PL, L> {
    pub fn new(book: OrderBook<PL, L>) -> Self {
        Market {
            book,
            external_order_ids: HashMap::new(),
            time: INITIAL_TIME.to_string(),
        }
    }

    pub fn book(&self) -> &OrderBook<PL, L> {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut OrderBook<PL, L> {
        &mut self.book
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// Resolves an exchange-origin message into a call against the
    /// book. `external` distinguishes exchange-authored messages (whose
    /// `order_id` is an opaque exchange string and whose `price` is a
    /// raw float) from agent-authored ones (already carrying an
    /// internal-compatible integer price).
    pub fn send_message(&mut self, message: &Message, external: bool) -> Vec<Trade> {
        if external {
            self.time = message.time.clone();
        }
        match &message.message_type {
            MessageType::Received { kind } => self.handle_received(message, kind, external),
            MessageType::Done { reason } => {
                self.handle_done(message, *reason, external);
                Vec::new()
            }
            MessageType::Change { new_size } => {
                self.handle_change(message, *new_size, external);
                Vec::new()
            }
        }
    }

    fn resolve_price(&self, message: &Message, external: bool) -> Price {
        if external {
            Price::from_float(message.price, self.book.multiplier())
        } else {
            Price(message.price as i64)
        }
    }

    fn handle_received(&mut self, message: &Message, kind: &OrderKind, external: bool) -> Vec<Trade> {
        match kind {
            OrderKind::Limit => {
                let price = self.resolve_price(message, external);
                let (trades, order_in_book) =
                    self.book
                        .limit(price, message.side, message.size, message.trader_id, self.time.clone());
                if external {
                    let external_id = message.order_id.as_ref().and_then(MessageOrderId::as_external);
                    if let (Some(oib), Some(external_id)) = (order_in_book, external_id) {
                        trace!(%external_id, internal_id = %oib.order_id, "recorded external order mapping");
                        self.external_order_ids
                            .insert(external_id.clone(), oib.order_id);
                    }
                }
                trades
            }
            OrderKind::Market => {
                if message.size.0 != -1.0 {
                    self.book
                        .market_order(message.size, message.side, message.trader_id, self.time.clone())
                } else {
                    let funds = message.funds * self.book.multiplier() as f64;
                    self.book
                        .market_order_funds(funds, message.side, message.trader_id, self.time.clone())
                }
            }
        }
    }

    fn handle_done(&mut self, message: &Message, reason: Reason, external: bool) {
        if reason != Reason::Canceled {
            return;
        }
        let Some(internal_id) = self.resolve_internal_id(message, external, /* pop = */ true) else {
            debug!(order_id = ?message.order_id, "done/canceled: unresolvable id, no-op");
            return;
        };
        self.book.cancel(internal_id);
    }

    fn handle_change(&mut self, message: &Message, new_size: Size, external: bool) {
        let Some(internal_id) = self.resolve_internal_id(message, external, /* pop = */ false) else {
            debug!(order_id = ?message.order_id, "change: unresolvable id, no-op");
            return;
        };
        self.book.update(internal_id, new_size);
    }

    /// `done canceled` always *pops* the external-id map (bounding the
    /// number of live external orders, per `SPEC_FULL.md` §9); `change`
    /// only looks it up, matching the source's asymmetric handling.
    fn resolve_internal_id(&mut self, message: &Message, external: bool, pop: bool) -> Option<OrderId> {
        if !external {
            return message.order_id.as_ref().and_then(MessageOrderId::as_internal);
        }
        let external_id = message.order_id.as_ref().and_then(MessageOrderId::as_external)?;
        if pop {
            self.external_order_ids.remove(external_id)
        } else {
            self.external_order_ids.get(external_id).copied()
        }
    }

    /// Bulk-loads a snapshot into an (assumed empty) book. Every entry
    /// is submitted as `trader_id = -1` (exchange-origin). The book is
    /// not expected to cross against itself; if it somehow does, the
    /// resulting trades are dropped — the snapshot is authoritative over
    /// whatever matching side effects loading it might otherwise cause.
    pub fn fill_snap(&mut self, snapshot: &Snapshot) {
        let multiplier = self.book.multiplier();
        for entries in [&snapshot.bids, &snapshot.asks] {
            for entry in entries {
                let price = Price::from_float(entry.price, multiplier);
                let (_trades, order_in_book) = self.book.limit(
                    price,
                    entry.side,
                    entry.size,
                    EXTERNAL_TRADER_ID,
                    self.time.clone(),
                );
                if let Some(oib) = order_in_book {
                    self.external_order_ids
                        .insert(entry.external_id.clone(), oib.order_id);
                }
            }
        }
    }
}

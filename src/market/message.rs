//! Message and snapshot types exchanged between the replay layer and
//! [`super::Market`].
//!
//! Grounded in `original_source/order_book/order_types.py`'s message
//! constructors (`limit_message`, `market_message`, `cancel_message`,
//! `change_message`) and in the wire shapes from `spec.md` §6. `price`
//! and `funds` stay raw `f64` on [`Message`] — [`super::Market`] is the
//! only place that converts price to fixed-point ticks, since that
//! conversion depends on whether the message is external or
//! agent-authored (`SPEC_FULL.md` §4.4).

use crate::types::{ExternalOrderId, OrderId, Side, Size};

/// Either an engine-assigned id (agent-authored messages) or an opaque
/// exchange id (external messages). Spec §4.4's `order_id` field means
/// one or the other depending on message origin; this type makes that
/// explicit instead of overloading a single string/int field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MessageOrderId {
    External(ExternalOrderId),
    Internal(OrderId),
}

impl MessageOrderId {
    pub fn as_external(&self) -> Option<&ExternalOrderId> {
        match self {
            MessageOrderId::External(id) => Some(id),
            MessageOrderId::Internal(_) => None,
        }
    }

    pub fn as_internal(&self) -> Option<OrderId> {
        match self {
            MessageOrderId::Internal(id) => Some(*id),
            MessageOrderId::External(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderKind {
    Limit,
    Market,
}

/// The `reason` field of a `done` message. Only `Canceled` triggers a
/// `cancel()` call (spec §4.4's dispatch table); `Filled` is a no-op
/// since the book already removed the order as it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Reason {
    Filled,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MessageType {
    Received { kind: OrderKind },
    Done { reason: Reason },
    Change { new_size: Size },
}

/// One L3 feed event, already decoded out of whatever wire format
/// carried it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub message_type: MessageType,
    pub side: Side,
    pub price: f64,
    /// `-1.0` is the wire sentinel for "absent" (a funds-denominated
    /// market order has no `size`).
    pub size: Size,
    /// `-1.0` is the wire sentinel for "absent".
    pub funds: f64,
    pub trader_id: i64,
    pub order_id: Option<MessageOrderId>,
    pub time: String,
}

/// Sentinel used on the wire for an absent `size`/`funds` field.
pub const ABSENT: f64 = -1.0;

impl Message {
    pub fn received_limit(
        side: Side,
        price: f64,
        size: Size,
        trader_id: i64,
        order_id: Option<MessageOrderId>,
        time: impl Into<String>,
    ) -> Self {
        Message {
            message_type: MessageType::Received {
                kind: OrderKind::Limit,
            },
            side,
            price,
            size,
            funds: ABSENT,
            trader_id,
            order_id,
            time: time.into(),
        }
    }

    pub fn received_market_size(side: Side, size: Size, trader_id: i64, time: impl Into<String>) -> Self {
        Message {
            message_type: MessageType::Received {
                kind: OrderKind::Market,
            },
            side,
            price: 0.0,
            size,
            funds: ABSENT,
            trader_id,
            order_id: None,
            time: time.into(),
        }
    }

    pub fn received_market_funds(side: Side, funds: f64, trader_id: i64, time: impl Into<String>) -> Self {
        Message {
            message_type: MessageType::Received {
                kind: OrderKind::Market,
            },
            side,
            price: 0.0,
            size: Size(ABSENT),
            funds,
            trader_id,
            order_id: None,
            time: time.into(),
        }
    }

    pub fn done_canceled(
        side: Side,
        order_id: MessageOrderId,
        trader_id: i64,
        time: impl Into<String>,
    ) -> Self {
        Message {
            message_type: MessageType::Done {
                reason: Reason::Canceled,
            },
            side,
            price: 0.0,
            size: Size(ABSENT),
            funds: ABSENT,
            trader_id,
            order_id: Some(order_id),
            time: time.into(),
        }
    }

    pub fn change(
        side: Side,
        order_id: MessageOrderId,
        new_size: Size,
        trader_id: i64,
        time: impl Into<String>,
    ) -> Self {
        Message {
            message_type: MessageType::Change { new_size },
            side,
            price: 0.0,
            size: Size(ABSENT),
            funds: ABSENT,
            trader_id,
            order_id: Some(order_id),
            time: time.into(),
        }
    }
}

/// One resting order inside a [`Snapshot`]. `price` stays a raw `f64`,
/// matching the source's `ExternalMarket.fill_snap` (`to_int(float(...),
/// multiplier)` runs inside `fill_snap`, not while parsing the snapshot
/// file) — [`super::Market::fill_snap`] is where the fixed-point
/// conversion happens.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOrder {
    pub side: Side,
    pub price: f64,
    pub size: Size,
    pub external_id: ExternalOrderId,
}

/// A full enumeration of every resting order as of `sequence`, per
/// spec §6's snapshot file shape. There is no `time` field here — the
/// source tracks wall-clock time as state on the market itself
/// (`ExternalMarket.time`, updated only by external messages), not on
/// the snapshot; see [`super::Market::time`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub sequence: u64,
    pub bids: Vec<SnapshotOrder>,
    pub asks: Vec<SnapshotOrder>,
}

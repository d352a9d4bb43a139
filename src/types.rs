//! Core value types shared across the price level, matching, and replay
//! layers: fixed-point prices, floating-point sizes, order identity, and
//! trade reports.

use std::fmt;

/// A price expressed in integer ticks.
///
/// All matching arithmetic happens in this representation; the only
/// float boundary is at message ingest (see [`Price::from_float`]) and at
/// human-readable output (see [`Price::to_float`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Price(pub i64);

impl Price {
    /// Converts a decimal price to its fixed-point tick representation.
    ///
    /// Adds a small epsilon before truncation so that exact-decimal float
    /// inputs round to the intended tick (naive `(p * multiplier) as i64`
    /// corrupts prices like `99.99` on some float paths).
    pub fn from_float(price: f64, multiplier: i64) -> Self {
        Price(((price + 1e-9) * multiplier as f64) as i64)
    }

    /// Converts back to a decimal price, rounded to `tick_dec` places.
    pub fn to_float(self, tick_dec: u32, multiplier: i64) -> f64 {
        let scale = 10f64.powi(tick_dec as i32);
        (self.0 as f64 / multiplier as f64 * scale).round() / scale
    }

}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resting or traded quantity.
///
/// Sizes remain floats because exchange feeds carry arbitrary decimals;
/// comparisons in matching are only `<` and `== 0.0` after subtraction, so
/// the usual float-equality pitfalls don't apply here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Size(pub f64);

/// Epsilon used when testing exhaustion of funds-denominated orders.
pub const SIZE_EPSILON: f64 = 1e-10;

impl Size {
    pub const ZERO: Size = Size(0.0);

    pub fn is_exhausted(self) -> bool {
        self.0 <= SIZE_EPSILON
    }
}

impl std::ops::Sub for Size {
    type Output = Size;
    fn sub(self, rhs: Size) -> Size {
        Size(self.0 - rhs.0)
    }
}

impl std::ops::Add for Size {
    type Output = Size;
    fn add(self, rhs: Size) -> Size {
        Size(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Size {
    fn add_assign(&mut self, rhs: Size) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Size {
    fn sub_assign(&mut self, rhs: Size) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Internal order identifier, assigned by the owning `OrderBook` from a
/// monotonic counter starting at 1. Zero is never assigned, which lets
/// callers use `Option<OrderId>` without extra tagging where useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque exchange-assigned order identifier (e.g. a Coinbase UUID
/// string). Preserved byte-for-byte; never parsed, hashed as an integer,
/// or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ExternalOrderId(pub Box<str>);

impl From<&str> for ExternalOrderId {
    fn from(s: &str) -> Self {
        ExternalOrderId(s.into())
    }
}

impl From<String> for ExternalOrderId {
    fn from(s: String) -> Self {
        ExternalOrderId(s.into_boxed_str())
    }
}

impl fmt::Display for ExternalOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `trader_id = -1` is the reserved sentinel for exchange-origin
/// (external) orders; agent-authored orders use any other integer.
pub const EXTERNAL_TRADER_ID: i64 = -1;

/// A resting order. Lives in exactly one [`crate::price_level::PriceLevel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub side: Side,
    pub price: Price,
    pub size: Size,
    pub trader_id: i64,
    pub order_id: OrderId,
}

/// A lightweight view returned to callers after a limit order rests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderInBook {
    pub order_id: OrderId,
    pub remaining_size: Size,
    pub side: Side,
    pub price: Price,
}

/// One execution report. `taker_side` is the side of the aggressor.
/// `time` is caller-supplied; the engine never invents one.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub taker_trader_id: i64,
    pub maker_trader_id: i64,
    pub price: Price,
    pub size: Size,
    pub maker_order_id: OrderId,
    pub taker_side: Side,
    pub time: String,
}

//! A `PriceLevel` is a FIFO bucket of resting orders at one price on one
//! side. Two variants are provided so their performance can be compared
//! (see `SPEC_FULL.md` §4.1): an insertion-ordered map and an arena-backed
//! doubly-linked deque. Both satisfy the same contract; the deque is the
//! recommended production choice because it gives O(1) cancel-by-handle.

mod deque;
mod ordered_map;

pub use deque::DequeLevel;
pub use ordered_map::OrderedMapLevel;

use crate::types::{Order, OrderId, Price, Size};

/// FIFO bucket of resting orders at one price.
///
/// Invariant: `total_size() == sum of order.size for every resting
/// order`. Implementations maintain this as a running total rather than
/// recomputing it by summation on every query.
pub trait PriceLevel {
    /// Opaque handle a caller can hold to reach an order in O(1) without
    /// looking it up by [`OrderId`] again. The [`crate::orderbook`] layer
    /// stores this handle in its `orders` index.
    type Handle: Copy + Eq + std::fmt::Debug;

    fn new(price: Price) -> Self
    where
        Self: Sized;

    fn price(&self) -> Price;

    fn total_size(&self) -> Size;

    fn is_empty(&self) -> bool {
        self.total_size().0 <= crate::types::SIZE_EPSILON
    }

    /// Appends `order` to the tail. O(1) amortized.
    fn append(&mut self, order: Order) -> Self::Handle;

    /// Peeks the head order (earliest arrival still resting).
    fn first(&self) -> Option<&Order>;

    /// Peeks the tail order (most recent arrival).
    fn last(&self) -> Option<&Order>;

    /// Removes and returns the head order.
    fn remove_first(&mut self) -> Option<Order>;

    /// Removes and returns the tail order.
    fn remove_last(&mut self) -> Option<Order>;

    /// Removes the order identified by `handle`. The deque variant does
    /// this in O(1) via back-pointers; the ordered-map variant is
    /// O(level_depth) since removing from the middle of an insertion-
    /// ordered map requires a shift.
    fn remove(&mut self, handle: Self::Handle) -> Option<Order>;

    /// Looks up the order currently bound to `handle` without removing it.
    fn get(&self, handle: Self::Handle) -> Option<&Order>;

    /// The handle of the current head, if any. Used by the matcher to
    /// walk the FIFO without tracking per-order handles itself.
    fn first_handle(&self) -> Option<Self::Handle>;

    /// Mutates the order's size by `delta` (may be negative). The
    /// order's position in the FIFO is preserved — partial fills and
    /// resizes do not re-queue it, which keeps time priority exactly as
    /// on the source exchange.
    fn update(&mut self, handle: Self::Handle, delta: Size) -> bool;
}

/// Handle used by [`OrderedMapLevel`]: the order's own id, since the map
/// is keyed by it directly.
pub type OrderedMapHandle = OrderId;

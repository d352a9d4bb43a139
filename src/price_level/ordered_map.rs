//! Insertion-ordered map variant of [`super::PriceLevel`], keyed by
//! [`OrderId`]. Grounded in the reference implementation's
//! `OrderedDictLevel` (an `OrderedDict` with `popitem(last=False/True)`
//! for head/tail removal).

use indexmap::IndexMap;

use super::PriceLevel;
use crate::types::{Order, OrderId, Price, Size};

/// FIFO bucket backed by `indexmap::IndexMap<OrderId, Order>`.
///
/// Removing an order from the middle (`remove`) costs `O(level_depth)`
/// because `IndexMap::shift_remove` preserves the arrival order of the
/// remaining entries. This variant exists primarily so the dense deque
/// can be benchmarked against it; the deque is the recommended choice
/// when cancel-by-handle is on the hot path.
#[derive(Debug, Clone)]
pub struct OrderedMapLevel {
    price: Price,
    orders: IndexMap<OrderId, Order>,
    total_size: Size,
}

impl PriceLevel for OrderedMapLevel {
    type Handle = OrderId;

    fn new(price: Price) -> Self {
        OrderedMapLevel {
            price,
            orders: IndexMap::new(),
            total_size: Size::ZERO,
        }
    }

    fn price(&self) -> Price {
        self.price
    }

    fn total_size(&self) -> Size {
        self.total_size
    }

    fn append(&mut self, order: Order) -> OrderId {
        let id = order.order_id;
        self.total_size += order.size;
        self.orders.insert(id, order);
        id
    }

    fn first(&self) -> Option<&Order> {
        self.orders.first().map(|(_, o)| o)
    }

    fn last(&self) -> Option<&Order> {
        self.orders.last().map(|(_, o)| o)
    }

    fn remove_first(&mut self) -> Option<Order> {
        let (_, order) = self.orders.shift_remove_index(0)?;
        self.total_size -= order.size;
        Some(order)
    }

    fn remove_last(&mut self) -> Option<Order> {
        let last_index = self.orders.len().checked_sub(1)?;
        let (_, order) = self.orders.shift_remove_index(last_index)?;
        self.total_size -= order.size;
        Some(order)
    }

    fn remove(&mut self, handle: OrderId) -> Option<Order> {
        let order = self.orders.shift_remove(&handle)?;
        self.total_size -= order.size;
        Some(order)
    }

    fn get(&self, handle: OrderId) -> Option<&Order> {
        self.orders.get(&handle)
    }

    fn first_handle(&self) -> Option<OrderId> {
        self.orders.first().map(|(id, _)| *id)
    }

    fn update(&mut self, handle: OrderId, delta: Size) -> bool {
        match self.orders.get_mut(&handle) {
            Some(order) => {
                order.size += delta;
                self.total_size += delta;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, EXTERNAL_TRADER_ID};

    fn order(id: u64, size: f64) -> Order {
        Order {
            side: Side::Buy,
            price: Price(10000),
            size: Size(size),
            trader_id: EXTERNAL_TRADER_ID,
            order_id: OrderId(id),
        }
    }

    #[test]
    fn append_preserves_arrival_order_for_first_and_last() {
        let mut level = OrderedMapLevel::new(Price(10000));
        level.append(order(1, 1.0));
        level.append(order(2, 2.0));
        level.append(order(3, 3.0));
        assert_eq!(level.first().unwrap().order_id, OrderId(1));
        assert_eq!(level.last().unwrap().order_id, OrderId(3));
        assert_eq!(level.total_size(), Size(6.0));
    }

    #[test]
    fn update_preserves_position_in_fifo() {
        let mut level = OrderedMapLevel::new(Price(10000));
        level.append(order(1, 1.0));
        level.append(order(2, 2.0));
        level.update(OrderId(1), Size(-0.4));
        assert_eq!(level.first().unwrap().order_id, OrderId(1));
        assert_eq!(level.first().unwrap().size, Size(0.6));
        assert_eq!(level.total_size(), Size(2.6));
    }

    #[test]
    fn remove_first_then_the_next_order_becomes_head() {
        let mut level = OrderedMapLevel::new(Price(10000));
        level.append(order(1, 1.0));
        level.append(order(2, 2.0));
        let removed = level.remove_first().unwrap();
        assert_eq!(removed.order_id, OrderId(1));
        assert_eq!(level.first().unwrap().order_id, OrderId(2));
        assert_eq!(level.total_size(), Size(2.0));
    }
}

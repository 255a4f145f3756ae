//! Order pool - slab of resting orders with O(1) alloc/free.
//!
//! Handles are plain u32 indices, so they stay valid while siblings are
//! inserted or removed; the id index stores one per live order to make
//! cancellation O(1). A free list is threaded through the `next` field of
//! vacant slots.

use std::fmt;

use crate::order::{OrderId, OrderType, Price, Quantity, Side};

/// Sentinel for "no slot" (list ends, empty free list).
pub const NIL: OrderRef = u32::MAX;

/// Stable handle to a pool slot.
pub type OrderRef = u32;

/// A resting order plus its FIFO linkage within a price level.
#[derive(Clone, Copy, Debug)]
pub struct RestingOrder {
    /// External order id
    pub id: OrderId,
    /// Book side this order rests on
    pub side: Side,
    /// Lifetime policy; never `Market` once resting
    pub kind: OrderType,
    /// Resolved limit price
    pub price: Price,
    /// Quantity at admission
    pub initial_qty: Quantity,
    /// Quantity still unfilled
    pub remaining_qty: Quantity,
    /// Next order at the same price level (toward the tail)
    pub next: OrderRef,
    /// Previous order at the same price level (toward the head)
    pub prev: OrderRef,
}

impl RestingOrder {
    const fn vacant() -> Self {
        Self {
            id: 0,
            side: Side::Buy,
            kind: OrderType::GoodTillCancel,
            price: 0,
            initial_qty: 0,
            remaining_qty: 0,
            next: NIL,
            prev: NIL,
        }
    }

    /// Quantity already executed.
    #[inline]
    pub const fn filled_qty(&self) -> Quantity {
        self.initial_qty - self.remaining_qty
    }

    /// True once nothing remains to fill.
    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.remaining_qty == 0
    }

    /// Execute `quantity` against this order.
    ///
    /// # Panics
    /// A fill larger than the remaining quantity means the matching loop is
    /// broken; that is a fatal invariant violation, not a recoverable error.
    #[inline]
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_qty,
            "order {}: fill of {} exceeds remaining {}",
            self.id,
            quantity,
            self.remaining_qty,
        );
        self.remaining_qty -= quantity;
    }
}

/// Slab allocator for resting orders.
///
/// Grows on demand: when the free list is exhausted a new slot is pushed,
/// so admission never fails for capacity reasons. Handles are indices into
/// `slots` and survive growth.
pub struct OrderPool {
    slots: Vec<RestingOrder>,
    free_head: OrderRef,
    live: u32,
}

impl OrderPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NIL,
            live: 0,
        }
    }

    /// Create a pool with `capacity` slots pre-allocated and free-listed.
    pub fn with_capacity(capacity: u32) -> Self {
        assert!(capacity < NIL, "capacity must be less than NIL");

        let mut slots = vec![RestingOrder::vacant(); capacity as usize];
        for i in 0..capacity.saturating_sub(1) {
            slots[i as usize].next = i + 1;
        }
        if capacity > 0 {
            slots[(capacity - 1) as usize].next = NIL;
        }

        Self {
            slots,
            free_head: if capacity > 0 { 0 } else { NIL },
            live: 0,
        }
    }

    /// Allocate a slot and populate it with a resting order.
    ///
    /// # Complexity
    /// O(1) amortized (free-list pop, or a push when the pool grows)
    pub fn insert(
        &mut self,
        id: OrderId,
        side: Side,
        kind: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> OrderRef {
        let index = if self.free_head == NIL {
            assert!(self.slots.len() < NIL as usize, "order pool exhausted");
            self.slots.push(RestingOrder::vacant());
            (self.slots.len() - 1) as OrderRef
        } else {
            let index = self.free_head;
            self.free_head = self.slots[index as usize].next;
            index
        };

        self.slots[index as usize] = RestingOrder {
            id,
            side,
            kind,
            price,
            initial_qty: quantity,
            remaining_qty: quantity,
            next: NIL,
            prev: NIL,
        };
        self.live += 1;

        index
    }

    /// Return a slot to the free list.
    ///
    /// The caller must ensure the handle is live and not already freed.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn free(&mut self, index: OrderRef) {
        debug_assert!((index as usize) < self.slots.len(), "handle out of bounds");
        debug_assert!(self.live > 0, "double free detected");

        let slot = &mut self.slots[index as usize];
        *slot = RestingOrder::vacant();
        slot.next = self.free_head;
        self.free_head = index;
        self.live -= 1;
    }

    /// Immutable access to a live slot.
    #[inline]
    pub fn get(&self, index: OrderRef) -> &RestingOrder {
        &self.slots[index as usize]
    }

    /// Mutable access to a live slot.
    #[inline]
    pub fn get_mut(&mut self, index: OrderRef) -> &mut RestingOrder {
        &mut self.slots[index as usize]
    }

    /// Number of live orders in the pool.
    #[inline]
    pub fn live(&self) -> u32 {
        self.live
    }
}

impl Default for OrderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPool")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("free_head", &self.free_head)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_read_back() {
        let mut pool = OrderPool::new();
        let r = pool.insert(42, Side::Sell, OrderType::GoodForDay, 105, 30);

        let order = pool.get(r);
        assert_eq!(order.id, 42);
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.kind, OrderType::GoodForDay);
        assert_eq!(order.price, 105);
        assert_eq!(order.initial_qty, 30);
        assert_eq!(order.remaining_qty, 30);
        assert_eq!(pool.live(), 1);
    }

    #[test]
    fn test_free_slot_is_reused() {
        let mut pool = OrderPool::with_capacity(2);
        let a = pool.insert(1, Side::Buy, OrderType::GoodTillCancel, 100, 10);
        let b = pool.insert(2, Side::Buy, OrderType::GoodTillCancel, 100, 10);
        assert_eq!(pool.live(), 2);

        pool.free(a);
        assert_eq!(pool.live(), 1);

        let c = pool.insert(3, Side::Buy, OrderType::GoodTillCancel, 101, 5);
        assert_eq!(c, a, "freed slot should be reused");
        assert_ne!(c, b);
        assert_eq!(pool.get(c).id, 3);
    }

    #[test]
    fn test_grows_past_preallocation() {
        let mut pool = OrderPool::with_capacity(1);
        let a = pool.insert(1, Side::Buy, OrderType::GoodTillCancel, 100, 10);
        let b = pool.insert(2, Side::Sell, OrderType::GoodTillCancel, 101, 10);
        assert_ne!(a, b);
        assert_eq!(pool.live(), 2);
        assert_eq!(pool.get(a).id, 1);
        assert_eq!(pool.get(b).id, 2);
    }

    #[test]
    fn test_fill_decrements_remaining() {
        let mut pool = OrderPool::new();
        let r = pool.insert(1, Side::Buy, OrderType::GoodTillCancel, 100, 10);

        pool.get_mut(r).fill(4);
        assert_eq!(pool.get(r).remaining_qty, 6);
        assert_eq!(pool.get(r).filled_qty(), 4);
        assert!(!pool.get(r).is_filled());

        pool.get_mut(r).fill(6);
        assert!(pool.get(r).is_filled());
    }

    #[test]
    #[should_panic(expected = "exceeds remaining")]
    fn test_overfill_panics() {
        let mut pool = OrderPool::new();
        let r = pool.insert(9, Side::Buy, OrderType::GoodTillCancel, 100, 10);
        pool.get_mut(r).fill(11);
    }
}

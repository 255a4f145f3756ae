//! Book core - the two price-ordered sides, the id index, and the pool.
//!
//! Structural operations live here; the admission policy and the matching
//! loop are in `matching`. Both sides are `BTreeMap`s keyed by price, so
//! insertion and level erasure are O(log P) and best-first iteration is the
//! map's native order (reversed for bids). Cancellation is O(1) in the
//! level thanks to the pool handle stored in the id index.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::depth::{Depth, LevelInfo};
use crate::order::{OrderId, OrderType, Price, Side};
use crate::pool::{OrderPool, OrderRef};
use crate::price_level::PriceLevel;

/// Single-threaded limit order book core.
///
/// This is the engine without the lock: every mutation leaves the book
/// uncrossed, the id index in sync with the side books, and the per-level
/// aggregates equal to the sum of their orders' remaining quantities. Wrap
/// it in [`crate::Orderbook`] for the thread-safe surface with the
/// Good-For-Day pruner.
pub struct Book {
    /// Bid levels; best = greatest key, iterate with `.rev()` for best-first
    pub(crate) bids: BTreeMap<Price, PriceLevel>,
    /// Ask levels; best = least key
    pub(crate) asks: BTreeMap<Price, PriceLevel>,
    /// Order id -> pool handle, the O(1) cancellation cross-index
    pub(crate) index: FxHashMap<OrderId, OrderRef>,
    /// Slab owning every resting order
    pub(crate) pool: OrderPool,
}

impl Book {
    /// Create an empty book.
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: FxHashMap::default(),
            pool: OrderPool::new(),
        }
    }

    /// Create an empty book with `orders` pool slots pre-allocated.
    pub fn with_capacity(orders: u32) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: FxHashMap::with_capacity_and_hasher(orders as usize, Default::default()),
            pool: OrderPool::with_capacity(orders),
        }
    }

    // ========================================================================
    // Best / worst price access
    // ========================================================================

    /// Best (highest) bid price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(price, _)| *price)
    }

    /// Best (lowest) ask price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(price, _)| *price)
    }

    /// Worst price on the side opposite `side`: the greatest ask for a buy,
    /// the least bid for a sell. A market order pinned here crosses every
    /// resting opposite order without resting beyond them.
    #[inline]
    pub(crate) fn worst_opposite(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.asks.last_key_value().map(|(price, _)| *price),
            Side::Sell => self.bids.first_key_value().map(|(price, _)| *price),
        }
    }

    // ========================================================================
    // Order management
    // ========================================================================

    /// True if an order with this id is live.
    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of live orders.
    #[inline]
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// True if no orders are resting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct bid price levels.
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Place an admitted order at the tail of its price level, creating the
    /// level if absent, and record it in the id index.
    pub(crate) fn rest(&mut self, index: OrderRef) {
        let order = *self.pool.get(index);
        let side_book = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        side_book
            .entry(order.price)
            .or_insert_with(PriceLevel::new)
            .push_back(&mut self.pool, index);
        self.index.insert(order.id, index);
        trace!(
            id = order.id,
            side = %order.side,
            price = order.price,
            qty = order.remaining_qty,
            "order resting"
        );
    }

    /// Cancel a live order. Unknown ids are a no-op.
    ///
    /// This is also the internal path used by the matching loop's
    /// Fill-And-Kill tail and by the Good-For-Day batch.
    pub fn cancel_order(&mut self, id: OrderId) {
        let Some(index) = self.index.remove(&id) else {
            trace!(id, "cancel of unknown order ignored");
            return;
        };

        let order = *self.pool.get(index);
        let side_book = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = side_book.get_mut(&order.price) {
            if level.unlink(&mut self.pool, index) {
                side_book.remove(&order.price);
            }
        }
        self.pool.free(index);
        trace!(id, side = %order.side, price = order.price, "order cancelled");
    }

    /// Ids of every live Good-For-Day order. Collected by the pruner under
    /// the book lock; the batch cancel happens under a fresh acquisition.
    pub fn good_for_day_ids(&self) -> Vec<OrderId> {
        self.index
            .iter()
            .filter(|(_, &index)| self.pool.get(index).kind == OrderType::GoodForDay)
            .map(|(&id, _)| id)
            .collect()
    }

    // ========================================================================
    // Depth projection
    // ========================================================================

    /// Aggregate both sides into a depth snapshot, best-first.
    pub fn depth(&self) -> Depth {
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.total_quantity(),
            })
            .collect();
        let asks = self
            .asks
            .iter()
            .map(|(&price, level)| LevelInfo {
                price,
                quantity: level.total_quantity(),
            })
            .collect();
        Depth { bids, asks }
    }
}

#[cfg(test)]
impl Book {
    /// Test-only: verify the cross-index, level linkage, and aggregates all
    /// agree, and that the book is uncrossed.
    pub(crate) fn assert_consistent(&self) {
        use crate::pool::NIL;

        // Every indexed id dereferences to a slot carrying that id, resting
        // in a level that matches its side and price.
        for (&id, &index) in &self.index {
            let order = self.pool.get(index);
            assert_eq!(order.id, id, "index id and slot id disagree");
            assert!(
                matches!(order.kind, OrderType::GoodTillCancel | OrderType::GoodForDay),
                "order {id} resting with non-resting type {:?}",
                order.kind
            );
            let level = match order.side {
                Side::Buy => self.bids.get(&order.price),
                Side::Sell => self.asks.get(&order.price),
            };
            assert!(level.is_some(), "order {id} points at a missing level");
        }
        assert_eq!(self.index.len(), self.pool.live() as usize);

        // Aggregates equal the sums over the linked orders.
        for (side_book, side) in [(&self.bids, Side::Buy), (&self.asks, Side::Sell)] {
            for (&price, level) in side_book {
                assert!(!level.is_empty(), "empty level left at {price}");
                let mut qty = 0u64;
                let mut count = 0u32;
                let mut cursor = level.peek_head();
                while cursor != NIL {
                    let order = self.pool.get(cursor);
                    assert_eq!(order.side, side);
                    assert_eq!(order.price, price);
                    qty += order.remaining_qty as u64;
                    count += 1;
                    cursor = order.next;
                }
                assert_eq!(level.total_quantity(), qty, "aggregate quantity drifted at {price}");
                assert_eq!(level.order_count(), count, "aggregate count drifted at {price}");
            }
        }

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "book left crossed: bid {bid} >= ask {ask}");
        }
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.index.len())
            .finish()
    }
}

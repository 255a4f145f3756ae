//! Admission policy and the matching loop.
//!
//! An incoming order is validated against its lifetime policy, placed in
//! its side book, and the loop crosses the best bid against the best ask
//! until the book is no longer crossable. Trade legs carry each resting
//! order's own limit price; the two legs of a fill are never collapsed.

use tracing::{debug, trace};

use crate::book::Book;
use crate::order::{Order, OrderModify, OrderType, Price, Quantity, Side};
use crate::pool::NIL;
use crate::trade::{Trade, TradeLeg};

impl Book {
    /// Admit an order and run the matching loop.
    ///
    /// Returns the trades produced, which is empty when the order is
    /// rejected: duplicate id, market order with an empty opposite side,
    /// Fill-And-Kill with nothing to cross, or Fill-Or-Kill without enough
    /// acceptable liquidity. Rejection leaves the book untouched.
    pub fn add_order(&mut self, order: Order) -> Vec<Trade> {
        if self.contains(order.id) {
            debug!(id = order.id, "duplicate order id rejected");
            return Vec::new();
        }

        // A market order must cross immediately; pin it to the worst
        // opposite price and let it rest as Good-Till-Cancel if anything
        // is left after sweeping the far side.
        let order = if order.order_type == OrderType::Market {
            match self.worst_opposite(order.side) {
                Some(worst) => order.into_limit(worst),
                None => {
                    debug!(id = order.id, "market order with empty opposite side rejected");
                    return Vec::new();
                }
            }
        } else {
            order
        };

        let Some(price) = order.price else {
            debug!(id = order.id, "priced order type without a price rejected");
            return Vec::new();
        };

        match order.order_type {
            OrderType::FillAndKill if !self.can_match(order.side, price) => {
                debug!(id = order.id, "fill-and-kill with nothing to cross rejected");
                return Vec::new();
            }
            OrderType::FillOrKill if !self.can_fully_fill(order.side, price, order.quantity) => {
                debug!(id = order.id, "fill-or-kill without full liquidity rejected");
                return Vec::new();
            }
            _ => {}
        }

        let index = self
            .pool
            .insert(order.id, order.side, order.order_type, price, order.quantity);
        self.rest(index);

        self.match_orders()
    }

    /// Replace a live order: cancel it and re-admit with the new side,
    /// price, and quantity, preserving the original lifetime policy. The
    /// replacement goes through full admission and loses its time
    /// priority. Unknown ids are a no-op.
    pub fn modify_order(&mut self, modify: OrderModify) -> Vec<Trade> {
        let Some(&index) = self.index.get(&modify.id) else {
            trace!(id = modify.id, "modify of unknown order ignored");
            return Vec::new();
        };
        let kind = self.pool.get(index).kind;
        self.cancel_order(modify.id);
        self.add_order(Order::limit(
            kind,
            modify.id,
            modify.side,
            modify.price,
            modify.quantity,
        ))
    }

    // ========================================================================
    // Feasibility predicates
    // ========================================================================

    /// True iff an order at `price` would trade against the opposite side
    /// right now.
    #[inline]
    pub fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|ask| price >= ask),
            Side::Sell => self.best_bid().is_some_and(|bid| price <= bid),
        }
    }

    /// True iff `quantity` can fill immediately without crossing `price`.
    ///
    /// Walks the opposite side best-first, reading each level's aggregate;
    /// the walk stops at the first unacceptable price, which by map order
    /// rules out everything beyond it.
    pub fn can_fully_fill(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        let mut needed = quantity as u64;
        match side {
            Side::Buy => {
                for (&ask_price, level) in &self.asks {
                    if ask_price > price {
                        break;
                    }
                    if level.total_quantity() >= needed {
                        return true;
                    }
                    needed -= level.total_quantity();
                }
            }
            Side::Sell => {
                for (&bid_price, level) in self.bids.iter().rev() {
                    if bid_price < price {
                        break;
                    }
                    if level.total_quantity() >= needed {
                        return true;
                    }
                    needed -= level.total_quantity();
                }
            }
        }
        false
    }

    // ========================================================================
    // Matching loop
    // ========================================================================

    /// Cross the book until best bid < best ask, then cancel any
    /// Fill-And-Kill remainder left at the head of either side.
    fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // The heads of the two best levels trade until one level drains.
            loop {
                let Some(bid_level) = self.bids.get(&bid_price) else {
                    break;
                };
                let Some(ask_level) = self.asks.get(&ask_price) else {
                    break;
                };
                let bid_head = bid_level.peek_head();
                let ask_head = ask_level.peek_head();
                if bid_head == NIL || ask_head == NIL {
                    break;
                }

                let traded = {
                    let bid = self.pool.get(bid_head);
                    let ask = self.pool.get(ask_head);
                    bid.remaining_qty.min(ask.remaining_qty)
                };

                self.pool.get_mut(bid_head).fill(traded);
                self.pool.get_mut(ask_head).fill(traded);

                // Match action against both aggregates.
                self.bids.get_mut(&bid_price).unwrap().record_match(traded);
                self.asks.get_mut(&ask_price).unwrap().record_match(traded);

                let bid = *self.pool.get(bid_head);
                let ask = *self.pool.get(ask_head);
                trades.push(Trade::new(
                    TradeLeg {
                        order_id: bid.id,
                        price: bid.price,
                        quantity: traded,
                    },
                    TradeLeg {
                        order_id: ask.id,
                        price: ask.price,
                        quantity: traded,
                    },
                ));
                trace!(bid = bid.id, ask = ask.id, qty = traded, "trade");

                let mut level_drained = false;

                if bid.is_filled() {
                    // Nothing remains, so the unlink subtracts zero.
                    let drained = self
                        .bids
                        .get_mut(&bid_price)
                        .unwrap()
                        .unlink(&mut self.pool, bid_head);
                    self.index.remove(&bid.id);
                    self.pool.free(bid_head);
                    if drained {
                        self.bids.remove(&bid_price);
                        level_drained = true;
                    }
                }
                if ask.is_filled() {
                    let drained = self
                        .asks
                        .get_mut(&ask_price)
                        .unwrap()
                        .unlink(&mut self.pool, ask_head);
                    self.index.remove(&ask.id);
                    self.pool.free(ask_head);
                    if drained {
                        self.asks.remove(&ask_price);
                        level_drained = true;
                    }
                }

                if level_drained {
                    break;
                }
            }
        }

        // A crossing Fill-And-Kill that could not fill completely is left
        // at the head of its side; it must not rest.
        self.cancel_fak_head(Side::Buy);
        self.cancel_fak_head(Side::Sell);

        trades
    }

    /// Cancel the head of `side`'s best level if it is a Fill-And-Kill.
    fn cancel_fak_head(&mut self, side: Side) {
        let head = match side {
            Side::Buy => self.bids.last_key_value().map(|(_, level)| level.peek_head()),
            Side::Sell => self.asks.first_key_value().map(|(_, level)| level.peek_head()),
        };
        let Some(head) = head else {
            return;
        };
        if head == NIL {
            return;
        }
        let order = self.pool.get(head);
        if order.kind == OrderType::FillAndKill {
            let id = order.id;
            debug!(id, "cancelling unfilled fill-and-kill remainder");
            self.cancel_order(id);
        }
    }
}

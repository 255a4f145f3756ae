//! Thread-safe order book with the Good-For-Day pruner.
//!
//! One exclusive mutex guards the book; every public operation is a single
//! short critical section, so operations are linearizable in lock order.
//! A background thread sleeps until the configured session close, then
//! cancels all Good-For-Day orders in one locked batch. Dropping the book
//! signals the thread and joins it, bounded no matter how far away the
//! close is.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Local;
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::book::Book;
use crate::depth::Depth;
use crate::order::{Order, OrderId, OrderModify};
use crate::session::SessionConfig;
use crate::trade::Trade;

struct Shared {
    book: Mutex<Book>,
    stop: Mutex<bool>,
    wake: Condvar,
    session: SessionConfig,
}

/// A live order book: the matching core behind a mutex, plus the pruner.
///
/// Orders handed to [`add_order`](Self::add_order) are owned by the book
/// once admitted; trades and depth snapshots are self-contained values.
pub struct Orderbook {
    shared: Arc<Shared>,
    pruner: Option<JoinHandle<()>>,
}

impl Orderbook {
    /// Create a book with the default session (16:00 local close).
    pub fn new() -> Self {
        Self::with_session(SessionConfig::default())
    }

    /// Create a book with a custom session close.
    pub fn with_session(session: SessionConfig) -> Self {
        let shared = Arc::new(Shared {
            book: Mutex::new(Book::new()),
            stop: Mutex::new(false),
            wake: Condvar::new(),
            session,
        });

        let pruner = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("gfd-pruner".into())
                .spawn(move || prune_loop(&shared))
                .expect("spawn pruner thread")
        };

        Self {
            shared,
            pruner: Some(pruner),
        }
    }

    /// Admit an order, match it, and return the trades produced.
    /// Empty on rejection (see [`Book::add_order`]).
    pub fn add_order(&self, order: Order) -> Vec<Trade> {
        self.shared.book.lock().add_order(order)
    }

    /// Cancel a live order; unknown ids are a no-op.
    pub fn cancel_order(&self, id: OrderId) {
        self.shared.book.lock().cancel_order(id);
    }

    /// Replace a live order, preserving its lifetime policy but not its
    /// time priority. The cancel and re-add happen under one lock
    /// acquisition, so no torn state is observable.
    pub fn modify_order(&self, modify: OrderModify) -> Vec<Trade> {
        self.shared.book.lock().modify_order(modify)
    }

    /// Number of live orders.
    pub fn size(&self) -> usize {
        self.shared.book.lock().size()
    }

    /// Aggregated depth on both sides, best-first.
    pub fn depth(&self) -> Depth {
        self.shared.book.lock().depth()
    }
}

impl Default for Orderbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Orderbook {
    fn drop(&mut self) {
        *self.shared.stop.lock() = true;
        self.shared.wake.notify_all();
        if let Some(pruner) = self.pruner.take() {
            let _ = pruner.join();
        }
    }
}

fn prune_loop(shared: &Shared) {
    loop {
        let wait = shared.session.until_next_close(Local::now());
        let deadline = std::time::Instant::now() + wait;
        {
            // Sleep until the close or a shutdown signal, whichever is first;
            // the loop absorbs spurious wakeups.
            let mut stop = shared.stop.lock();
            while !*stop {
                let remaining = deadline.saturating_duration_since(std::time::Instant::now());
                if remaining.is_zero() {
                    break;
                }
                shared.wake.wait_for(&mut stop, remaining);
            }
            if *stop {
                return;
            }
        }

        // Collect candidates under the lock, then cancel the batch under a
        // single fresh acquisition; the cancel path tolerates ids that
        // went away in between.
        let expired = shared.book.lock().good_for_day_ids();
        if expired.is_empty() {
            continue;
        }
        debug!(count = expired.len(), "session close, cancelling good-for-day orders");
        let mut book = shared.book.lock();
        for id in expired {
            book.cancel_order(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, Side};

    #[test]
    fn test_add_cancel_roundtrip() {
        let book = Orderbook::new();
        book.add_order(Order::limit(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10));
        assert_eq!(book.size(), 1);

        book.cancel_order(1);
        assert_eq!(book.size(), 0);
        assert_eq!(book.depth(), Depth::default());
    }

    #[test]
    fn test_concurrent_adds_all_admitted() {
        let book = Arc::new(Orderbook::new());
        let mut handles = Vec::new();

        for t in 0..4u64 {
            let book = Arc::clone(&book);
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    let id = t * 1000 + i;
                    // Disjoint price bands so nothing crosses.
                    let (side, price) = if t % 2 == 0 {
                        (Side::Buy, 90 - (i % 10) as i32)
                    } else {
                        (Side::Sell, 110 + (i % 10) as i32)
                    };
                    book.add_order(Order::limit(OrderType::GoodTillCancel, id, side, price, 1));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(book.size(), 400);
        let depth = book.depth();
        assert_eq!(depth.bid_volume(), 200);
        assert_eq!(depth.ask_volume(), 200);
    }

    #[test]
    fn test_drop_joins_pruner_far_from_close() {
        // Default close can be ~24h away; drop must still return promptly.
        let book = Orderbook::new();
        book.add_order(Order::limit(OrderType::GoodForDay, 1, Side::Buy, 100, 10));
        drop(book);
    }
}

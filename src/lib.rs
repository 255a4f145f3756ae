//! # Crossbook
//!
//! A single-instrument limit order book matching engine.
//!
//! ## Design
//!
//! - **Price-time priority**: ordered price levels per side, FIFO queues
//!   within a level.
//! - **O(log P) insert, O(1) cancel**: side books are B-tree maps keyed by
//!   price; every resting order lives in a pool slot whose handle is kept
//!   in the id index, so cancellation unlinks in constant time.
//! - **Lifetime policies**: Good-Till-Cancel, Good-For-Day, Fill-And-Kill,
//!   Fill-Or-Kill, and Market orders converted at admission to a limit at
//!   the worst opposite price.
//! - **Incremental depth**: each level carries its quantity/count
//!   aggregate, kept in lock-step with the orders through every mutation.
//! - **Session pruning**: a background thread cancels Good-For-Day orders
//!   at the configured session close (16:00 local by default).
//!
//! [`Book`] is the single-threaded core; [`Orderbook`] wraps it in a mutex,
//! owns the pruner thread, and is the intended public surface.
//!
//! ## Example
//!
//! ```
//! use crossbook::{Order, OrderType, Orderbook, Side};
//!
//! let book = Orderbook::new();
//! book.add_order(Order::limit(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10));
//! let trades = book.add_order(Order::limit(OrderType::GoodTillCancel, 2, Side::Sell, 100, 4));
//! assert_eq!(trades.len(), 1);
//! assert_eq!(book.depth().best_bid().unwrap().quantity, 6);
//! ```

pub mod book;
pub mod depth;
mod matching;
pub mod order;
pub mod orderbook;
pub mod pool;
pub mod price_level;
pub mod scenario;
pub mod session;
pub mod trade;

// Re-exports for convenience
pub use book::Book;
pub use depth::{Depth, LevelInfo};
pub use order::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
pub use orderbook::Orderbook;
pub use session::SessionConfig;
pub use trade::{Trade, TradeLeg};

//! Order requests and the value types they are built from.
//!
//! Prices are signed fixed-point integers (the tick is up to the caller),
//! quantities are unsigned, and order ids are caller-assigned.

use std::fmt;

/// Limit price in ticks. Signed so spread-like instruments can quote below zero.
pub type Price = i32;

/// Order quantity in units.
pub type Quantity = u32;

/// External, caller-assigned order identifier.
pub type OrderId = u64;

/// Order side (buy = bid, sell = ask)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Buy = 0,
    /// Sell side (asks)
    Sell = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// Order lifetime policy, checked at admission and enforced by the matching loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderType {
    /// No price preference; must cross immediately. Rewritten at admission to a
    /// Good-Till-Cancel limit at the worst opposite price.
    Market = 0,
    /// Rests until the session close, when the pruner cancels it.
    GoodForDay = 1,
    /// Rests until explicitly cancelled (default for most flows).
    GoodTillCancel = 2,
    /// Match whatever is immediately available, cancel the remainder.
    FillAndKill = 3,
    /// All-or-nothing: rejected outright unless the full quantity can fill now.
    FillOrKill = 4,
}

/// An incoming order request.
///
/// Market orders carry no price; admission assigns them the worst opposite
/// price and reclassifies them Good-Till-Cancel, so a resting order always
/// has a concrete limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    /// Caller-assigned id; duplicates are rejected at admission
    pub id: OrderId,
    /// Order side
    pub side: Side,
    /// Lifetime policy
    pub order_type: OrderType,
    /// Limit price; `None` only for `Market`
    pub price: Option<Price>,
    /// Requested quantity
    pub quantity: Quantity,
}

impl Order {
    /// Create a priced order of the given lifetime policy.
    #[inline]
    pub const fn limit(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            side,
            order_type,
            price: Some(price),
            quantity,
        }
    }

    /// Create a market order. The price is assigned at admission.
    #[inline]
    pub const fn market(id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self {
            id,
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
        }
    }

    /// Convert a market request into the Good-Till-Cancel limit it is admitted
    /// as, pinned to `price` (the worst price on the opposite side).
    #[inline]
    pub(crate) fn into_limit(self, price: Price) -> Self {
        Self {
            order_type: OrderType::GoodTillCancel,
            price: Some(price),
            ..self
        }
    }
}

/// A modify request: cancel the existing order and re-admit it with these
/// fields, preserving the original order's lifetime policy. The re-added
/// order goes to the back of its level's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderModify {
    /// Id of the order to replace (kept by the replacement)
    pub id: OrderId,
    /// New side
    pub side: Side,
    /// New limit price
    pub price: Price,
    /// New quantity
    pub quantity: Quantity,
}

impl OrderModify {
    /// Create a modify request.
    #[inline]
    pub const fn new(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            side,
            price,
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_limit_order_carries_price() {
        let order = Order::limit(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10);
        assert_eq!(order.price, Some(100));
        assert_eq!(order.order_type, OrderType::GoodTillCancel);
    }

    #[test]
    fn test_market_order_has_no_price() {
        let order = Order::market(7, Side::Sell, 25);
        assert_eq!(order.price, None);
        assert_eq!(order.order_type, OrderType::Market);
    }

    #[test]
    fn test_market_into_limit() {
        let order = Order::market(7, Side::Buy, 25).into_limit(105);
        assert_eq!(order.order_type, OrderType::GoodTillCancel);
        assert_eq!(order.price, Some(105));
        assert_eq!(order.id, 7);
        assert_eq!(order.quantity, 25);
    }
}

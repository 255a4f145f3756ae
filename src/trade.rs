//! Trade records produced by the matching loop.

use serde::{Deserialize, Serialize};

use crate::order::{OrderId, Price, Quantity};

/// One side's view of a fill. The price is that side's own limit price, so a
/// crossing order keeps its limit and the counterparty keeps theirs; the two
/// legs are never collapsed to a single execution price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLeg {
    /// Order that participated on this side
    pub order_id: OrderId,
    /// That order's limit price
    pub price: Price,
    /// Quantity exchanged
    pub quantity: Quantity,
}

/// A single fill between the head bid and the head ask, one leg per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Buy-side leg
    pub bid: TradeLeg,
    /// Sell-side leg
    pub ask: TradeLeg,
}

impl Trade {
    /// Pair two legs into a trade.
    #[inline]
    pub const fn new(bid: TradeLeg, ask: TradeLeg) -> Self {
        Self { bid, ask }
    }

    /// Quantity exchanged (identical on both legs).
    #[inline]
    pub const fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legs_keep_their_own_prices() {
        let trade = Trade::new(
            TradeLeg {
                order_id: 1,
                price: 101,
                quantity: 5,
            },
            TradeLeg {
                order_id: 2,
                price: 99,
                quantity: 5,
            },
        );
        assert_eq!(trade.bid.price, 101);
        assert_eq!(trade.ask.price, 99);
        assert_eq!(trade.quantity(), 5);
    }
}

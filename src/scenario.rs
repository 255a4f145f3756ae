//! Text scenario harness.
//!
//! A scenario is a line-oriented script of book operations with interleaved
//! state assertions, used by the integration tests and the `replay` binary:
//!
//! ```text
//! A <Side> <OrderType> <Price> <Quantity> <OrderId>   add order
//! M <OrderId> <Side> <Price> <Quantity>               modify order
//! C <OrderId>                                         cancel order
//! R <total_orders> <bid_levels> <ask_levels>          expected state
//! ```
//!
//! `Side` is `B` or `S`; `OrderType` is the enum name. Blank lines and
//! lines starting with `#` are skipped. Market adds ignore the price
//! column (the grammar still carries one).

use std::str::FromStr;

use thiserror::Error;

use crate::book::Book;
use crate::order::{Order, OrderId, OrderModify, OrderType, Side};

/// Scenario parse or expectation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    /// Line has too few fields for its action
    #[error("line {line}: truncated step")]
    Truncated {
        /// 1-based source line
        line: usize,
    },
    /// First field is not one of `A`/`M`/`C`/`R`
    #[error("line {line}: unknown action `{token}`")]
    UnknownAction {
        /// 1-based source line
        line: usize,
        /// Offending field
        token: String,
    },
    /// Side field is not `B` or `S`
    #[error("line {line}: unknown side `{token}`")]
    UnknownSide {
        /// 1-based source line
        line: usize,
        /// Offending field
        token: String,
    },
    /// Order type field is not an `OrderType` name
    #[error("line {line}: unknown order type `{token}`")]
    UnknownOrderType {
        /// 1-based source line
        line: usize,
        /// Offending field
        token: String,
    },
    /// Numeric field failed to parse
    #[error("line {line}: bad number `{token}`")]
    BadNumber {
        /// 1-based source line
        line: usize,
        /// Offending field
        token: String,
    },
    /// An `R` assertion did not match the book
    #[error(
        "line {line}: expected (orders, bid levels, ask levels) = {expected:?}, got {actual:?}"
    )]
    Expectation {
        /// 1-based source line of the `R` step
        line: usize,
        /// Values from the scenario
        expected: (usize, usize, usize),
        /// Values observed on the book
        actual: (usize, usize, usize),
    },
}

/// One parsed scenario line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Add an order
    Add(Order),
    /// Modify an order
    Modify(OrderModify),
    /// Cancel an order
    Cancel(OrderId),
    /// Assert book state
    Expect {
        /// Expected live order count
        orders: usize,
        /// Expected distinct bid levels
        bid_levels: usize,
        /// Expected distinct ask levels
        ask_levels: usize,
    },
}

/// Parse a whole scenario, keeping source line numbers for `R` assertions.
pub fn parse(text: &str) -> Result<Vec<(usize, Step)>, ScenarioError> {
    let mut steps = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        steps.push((line, parse_step(line, trimmed)?));
    }
    Ok(steps)
}

/// Replay a scenario against `book`, checking every `R` assertion.
pub fn run(book: &mut Book, text: &str) -> Result<(), ScenarioError> {
    for (line, step) in parse(text)? {
        match step {
            Step::Add(order) => {
                book.add_order(order);
            }
            Step::Modify(modify) => {
                book.modify_order(modify);
            }
            Step::Cancel(id) => book.cancel_order(id),
            Step::Expect {
                orders,
                bid_levels,
                ask_levels,
            } => {
                let actual = (book.size(), book.bid_levels(), book.ask_levels());
                let expected = (orders, bid_levels, ask_levels);
                if actual != expected {
                    return Err(ScenarioError::Expectation {
                        line,
                        expected,
                        actual,
                    });
                }
            }
        }
    }
    Ok(())
}

fn parse_step(line: usize, text: &str) -> Result<Step, ScenarioError> {
    let mut fields = text.split_whitespace();
    let action = fields.next().ok_or(ScenarioError::Truncated { line })?;
    let mut next = |line| fields.next().ok_or(ScenarioError::Truncated { line });

    match action {
        "A" => {
            let side = parse_side(line, next(line)?)?;
            let kind = parse_order_type(line, next(line)?)?;
            let price = parse_number(line, next(line)?)?;
            let quantity = parse_number(line, next(line)?)?;
            let id = parse_number(line, next(line)?)?;
            let order = match kind {
                OrderType::Market => Order::market(id, side, quantity),
                kind => Order::limit(kind, id, side, price, quantity),
            };
            Ok(Step::Add(order))
        }
        "M" => {
            let id = parse_number(line, next(line)?)?;
            let side = parse_side(line, next(line)?)?;
            let price = parse_number(line, next(line)?)?;
            let quantity = parse_number(line, next(line)?)?;
            Ok(Step::Modify(OrderModify::new(id, side, price, quantity)))
        }
        "C" => Ok(Step::Cancel(parse_number(line, next(line)?)?)),
        "R" => Ok(Step::Expect {
            orders: parse_number(line, next(line)?)?,
            bid_levels: parse_number(line, next(line)?)?,
            ask_levels: parse_number(line, next(line)?)?,
        }),
        token => Err(ScenarioError::UnknownAction {
            line,
            token: token.to_string(),
        }),
    }
}

fn parse_side(line: usize, token: &str) -> Result<Side, ScenarioError> {
    match token {
        "B" => Ok(Side::Buy),
        "S" => Ok(Side::Sell),
        _ => Err(ScenarioError::UnknownSide {
            line,
            token: token.to_string(),
        }),
    }
}

fn parse_order_type(line: usize, token: &str) -> Result<OrderType, ScenarioError> {
    match token {
        "Market" => Ok(OrderType::Market),
        "GoodForDay" => Ok(OrderType::GoodForDay),
        "GoodTillCancel" => Ok(OrderType::GoodTillCancel),
        "FillAndKill" => Ok(OrderType::FillAndKill),
        "FillOrKill" => Ok(OrderType::FillOrKill),
        _ => Err(ScenarioError::UnknownOrderType {
            line,
            token: token.to_string(),
        }),
    }
}

fn parse_number<T: FromStr>(line: usize, token: &str) -> Result<T, ScenarioError> {
    token.parse().map_err(|_| ScenarioError::BadNumber {
        line,
        token: token.to_string(),
    })
}

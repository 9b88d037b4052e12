//! Order-series invariants, checked independently of how the orders were made.
//!
//! A legal order series keeps the running net position within one unit on
//! every prefix and is flat after the last day.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::OrderSeries;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("net position {net} on {date} exceeds one unit")]
    PositionOutOfBounds { date: NaiveDate, net: i64 },

    #[error("series ends with open net position {net} on {date}")]
    NotFlat { date: NaiveDate, net: i64 },
}

/// Check the position bound on every prefix, then terminal flatness.
///
/// Reports the first offending day. An empty series is valid.
pub fn validate_orders(orders: &OrderSeries) -> Result<(), ValidationError> {
    let mut net = 0_i64;
    for (date, order) in orders.iter() {
        net += i64::from(order.units());
        if net.abs() > 1 {
            return Err(ValidationError::PositionOutOfBounds { date, net });
        }
    }
    match orders.index().last() {
        Some(date) if net != 0 => Err(ValidationError::NotFlat { date, net }),
        _ => Ok(()),
    }
}

//! Orders and the net position they accumulate into.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::series::{Series, SeriesError, TradingIndex};

/// Action taken on a single day, always one unit.
///
/// `Buy` opens a long or closes a short; `Sell` opens a short or closes a long.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Order {
    /// Signed unit change: -1, 0 or +1.
    pub fn units(self) -> i8 {
        match self {
            Order::Sell => -1,
            Order::Hold => 0,
            Order::Buy => 1,
        }
    }

    pub fn from_units(units: i64) -> Option<Self> {
        match units {
            -1 => Some(Order::Sell),
            0 => Some(Order::Hold),
            1 => Some(Order::Buy),
            _ => None,
        }
    }

    pub fn is_trade(self) -> bool {
        !matches!(self, Order::Hold)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.units())
    }
}

/// Net exposure in units, held within {-1, 0, +1}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetPosition(i8);

impl NetPosition {
    pub const SHORT: NetPosition = NetPosition(-1);
    pub const FLAT: NetPosition = NetPosition(0);
    pub const LONG: NetPosition = NetPosition(1);

    pub fn from_units(units: i64) -> Option<Self> {
        match units {
            -1 => Some(Self::SHORT),
            0 => Some(Self::FLAT),
            1 => Some(Self::LONG),
            _ => None,
        }
    }

    pub fn units(self) -> i8 {
        self.0
    }

    pub fn is_flat(self) -> bool {
        self.0 == 0
    }

    /// Room to add one unit of long exposure.
    pub fn can_buy(self) -> bool {
        self.0 < 1
    }

    /// Room to add one unit of short exposure.
    pub fn can_sell(self) -> bool {
        self.0 > -1
    }

    /// Position after `order`, or `None` if it would leave the band.
    pub fn apply(self, order: Order) -> Option<Self> {
        Self::from_units(i64::from(self.0) + i64::from(order.units()))
    }

    /// The order that brings this position back to flat.
    pub fn closing_order(self) -> Order {
        match self.0 {
            1 => Order::Sell,
            -1 => Order::Buy,
            _ => Order::Hold,
        }
    }
}

/// Per-day orders for one instrument.
pub type OrderSeries = Series<Order>;

impl Series<Order> {
    /// Parse integer order values, rejecting anything outside {-1, 0, 1}.
    ///
    /// Only the per-day range is checked here; see `validation` for the
    /// position-bound and terminal-flat invariants.
    pub fn from_values(index: TradingIndex, values: &[i64]) -> Result<Self, SeriesError> {
        if index.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        let orders = index
            .dates()
            .iter()
            .zip(values)
            .map(|(&date, &value)| {
                Order::from_units(value).ok_or(SeriesError::OutOfRange {
                    kind: "order",
                    date,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Series::on_index(index, orders))
    }

    /// Signed unit values, in index order.
    pub fn units(&self) -> Vec<i8> {
        self.values().iter().map(|o| o.units()).collect()
    }

    /// Running net position after each day (prefix sums).
    pub fn net_positions(&self) -> Vec<i64> {
        self.values()
            .iter()
            .scan(0_i64, |net, order| {
                *net += i64::from(order.units());
                Some(*net)
            })
            .collect()
    }

    /// Sum of all orders: the exposure left open after the last day.
    pub fn total_units(&self) -> i64 {
        self.values().iter().map(|o| i64::from(o.units())).sum()
    }

    pub fn trade_count(&self) -> usize {
        self.values().iter().filter(|o| o.is_trade()).count()
    }
}

//! Raw directional signal: a day's opinion before position constraints.

use serde::{Deserialize, Serialize};

use super::series::{Series, SeriesError, TradingIndex};

/// Directional opinion for a single day.
///
/// Signals say what the market looks like, not what the book holds: two
/// consecutive `Long` days are both bullish, not an instruction to buy twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Short,
    #[default]
    Neutral,
    Long,
}

impl Direction {
    /// Signed value: -1, 0 or +1.
    pub fn value(self) -> i8 {
        match self {
            Direction::Short => -1,
            Direction::Neutral => 0,
            Direction::Long => 1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Direction::Short),
            0 => Some(Direction::Neutral),
            1 => Some(Direction::Long),
            _ => None,
        }
    }

    /// Sign of a real number; zero and NaN are neutral.
    pub fn from_sign(x: f64) -> Self {
        if x > 0.0 {
            Direction::Long
        } else if x < 0.0 {
            Direction::Short
        } else {
            Direction::Neutral
        }
    }

    pub fn is_directional(self) -> bool {
        !matches!(self, Direction::Neutral)
    }
}

/// Raw per-day signals, not yet position-aware.
pub type SignalSeries = Series<Direction>;

impl Series<Direction> {
    /// Parse integer signal values, rejecting anything outside {-1, 0, 1}.
    pub fn from_values(index: TradingIndex, values: &[i64]) -> Result<Self, SeriesError> {
        if index.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        let directions = index
            .dates()
            .iter()
            .zip(values)
            .map(|(&date, &value)| {
                Direction::from_value(value).ok_or(SeriesError::OutOfRange {
                    kind: "signal",
                    date,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Series::on_index(index, directions))
    }

    pub fn directional_days(&self) -> usize {
        self.values().iter().filter(|d| d.is_directional()).count()
    }
}

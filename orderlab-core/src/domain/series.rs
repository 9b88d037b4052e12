//! Trading-day-indexed series.
//!
//! Every series derived from one price history shares the same `TradingIndex`.
//! Derived series clone the index handle, so alignment checks are a pointer
//! comparison in the common case and fall back to comparing dates.

use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while constructing or combining series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("trading index is not strictly increasing at position {position}: {previous} then {current}")]
    UnorderedIndex {
        position: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("series has {values} values but its index has {index} dates")]
    LengthMismatch { index: usize, values: usize },

    #[error("series are not aligned on the same trading index")]
    Misaligned,

    #[error("invalid price {value} on {date}: prices must be positive and finite")]
    InvalidPrice { date: NaiveDate, value: f64 },

    #[error("invalid {kind} value {value} on {date}: expected -1, 0 or 1")]
    OutOfRange {
        kind: &'static str,
        date: NaiveDate,
        value: i64,
    },
}

/// Strictly increasing sequence of trading days.
#[derive(Debug, Clone)]
pub struct TradingIndex {
    dates: Arc<[NaiveDate]>,
}

impl TradingIndex {
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, SeriesError> {
        for (position, pair) in dates.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(SeriesError::UnorderedIndex {
                    position: position + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self {
            dates: Arc::from(dates),
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<NaiveDate> {
        self.dates.get(position).copied()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

impl PartialEq for TradingIndex {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.dates, &other.dates) || self.dates == other.dates
    }
}

impl Eq for TradingIndex {}

/// Values keyed by a shared trading index, one value per day.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T> {
    index: TradingIndex,
    values: Vec<T>,
}

impl<T> Series<T> {
    pub fn new(index: TradingIndex, values: Vec<T>) -> Result<Self, SeriesError> {
        if index.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        Ok(Self { index, values })
    }

    /// Build a series whose length is known to match the index.
    pub(crate) fn on_index(index: TradingIndex, values: Vec<T>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self { index, values }
    }

    pub fn index(&self) -> &TradingIndex {
        &self.index
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.values.get(position)
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    /// Iterate `(date, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> + '_ {
        self.index.dates().iter().copied().zip(self.values.iter())
    }

    /// Derive a new series on the same index.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Series<U> {
        Series::on_index(self.index.clone(), self.values.iter().map(f).collect())
    }

    /// Attach new values of the same length to this series' index.
    pub(crate) fn with_values<U>(&self, values: Vec<U>) -> Series<U> {
        Series::on_index(self.index.clone(), values)
    }

    pub fn is_aligned_with<U>(&self, other: &Series<U>) -> bool {
        self.index == other.index
    }

    pub fn ensure_aligned<U>(&self, other: &Series<U>) -> Result<(), SeriesError> {
        if self.is_aligned_with(other) {
            Ok(())
        } else {
            Err(SeriesError::Misaligned)
        }
    }
}

/// Real-valued indicator readings. Warm-up days hold `f64::NAN`.
pub type IndicatorSeries = Series<f64>;

/// Adjusted close prices: positive and finite on every day.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    series: Series<f64>,
}

impl PriceSeries {
    pub fn new(index: TradingIndex, prices: Vec<f64>) -> Result<Self, SeriesError> {
        let series = Series::new(index, prices)?;
        for (date, &value) in series.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SeriesError::InvalidPrice { date, value });
            }
        }
        Ok(Self { series })
    }

    /// Build from `(date, price)` pairs already in trading-day order.
    pub fn from_pairs(pairs: Vec<(NaiveDate, f64)>) -> Result<Self, SeriesError> {
        let (dates, prices): (Vec<NaiveDate>, Vec<f64>) = pairs.into_iter().unzip();
        Self::new(TradingIndex::new(dates)?, prices)
    }

    pub fn series(&self) -> &Series<f64> {
        &self.series
    }

    pub fn index(&self) -> &TradingIndex {
        self.series.index()
    }

    pub fn values(&self) -> &[f64] {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &f64)> + '_ {
        self.series.iter()
    }
}

//! Indicator feed.
//!
//! Indicators are pure functions: price history in, numeric series out, one
//! value per trading day. The first `lookback()` values are `f64::NAN` so the
//! output stays aligned with the input index.
//!
//! # Look-ahead contamination guard
//! No indicator value at day t may depend on prices from day t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod momentum;
pub mod sma;
pub mod sma_ratio;

pub use momentum::Momentum;
pub use sma::Sma;
pub use sma_ratio::SmaRatio;

use crate::domain::{IndicatorSeries, PriceSeries, Series};

pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_ratio_30", "momentum_40").
    fn name(&self) -> &str;

    /// Number of days before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over a full price slice.
    ///
    /// Returns a `Vec<f64>` of the same length as `prices`.
    fn compute(&self, prices: &[f64]) -> Vec<f64>;

    /// Compute over a price series, keeping its trading index.
    fn feed(&self, prices: &PriceSeries) -> IndicatorSeries {
        Series::on_index(prices.index().clone(), self.compute(prices.values()))
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

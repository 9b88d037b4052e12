//! Simple Moving Average (SMA).
//!
//! Rolling mean of prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = prices[..self.period].iter().sum();
        let mut nan_in_window = sum.is_nan();
        if !nan_in_window {
            result[self.period - 1] = sum / self.period as f64;
        }

        for i in self.period..n {
            let leaving = prices[i - self.period];
            let entering = prices[i];

            // A NaN poisons the running sum; rescan the window until it leaves.
            if entering.is_nan() || leaving.is_nan() || nan_in_window {
                let window = &prices[(i + 1 - self.period)..=i];
                nan_in_window = window.iter().any(|p| p.is_nan());
                if nan_in_window {
                    continue;
                }
                sum = window.iter().sum();
            } else {
                sum = sum - leaving + entering;
            }

            result[i] = sum / self.period as f64;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = Sma::new(5).compute(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);

        assert_eq!(result.len(), 7);
        for (i, value) in result.iter().enumerate().take(4) {
            assert!(value.is_nan(), "expected NaN at index {i}");
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_price() {
        let result = Sma::new(1).compute(&[100.0, 200.0, 300.0]);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_propagation() {
        let result = Sma::new(3).compute(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0]);
        // Windows [10,11,NaN], [11,NaN,13], [NaN,13,14] are all poisoned.
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(30).lookback(), 29);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn sma_too_few_prices() {
        let result = Sma::new(5).compute(&[10.0, 11.0]);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}

//! Momentum: lookback return as a ratio.
//!
//! momentum[t] = price[t] / price[t-period] - 1
//! Lookback: period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let prev = prices[i - self.period];
            let curr = prices[i];
            if !(prev.is_nan() || curr.is_nan() || prev == 0.0) {
                result[i] = curr / prev - 1.0;
            }
        }

        result
    }
}

//! SMA ratio: how far price sits from its rolling mean.
//!
//! sma_ratio[t] = price[t] / sma(price, period)[t] - 1
//! Negative below the mean, positive above. Lookback: period - 1.

use super::{Indicator, Sma};

#[derive(Debug, Clone)]
pub struct SmaRatio {
    sma: Sma,
    name: String,
}

impl SmaRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA ratio period must be >= 1");
        Self {
            sma: Sma::new(period),
            name: format!("sma_ratio_{period}"),
        }
    }
}

impl Indicator for SmaRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.sma.lookback()
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        self.sma
            .compute(prices)
            .into_iter()
            .zip(prices)
            .map(|(mean, &price)| {
                if mean.is_nan() || price.is_nan() || mean == 0.0 {
                    f64::NAN
                } else {
                    price / mean - 1.0
                }
            })
            .collect()
    }
}

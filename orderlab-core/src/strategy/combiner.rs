//! Signal combiner: two indicator readings in, one raw signal out.
//!
//! Each indicator votes on its own:
//! - SMA ratio below zero (price under its mean) reads as oversold → Long;
//!   above zero → Short.
//! - Momentum below the lower threshold → Short; above the upper threshold → Long.
//!
//! The votes are combined by conjunction: a day is directional only when both
//! agree. Undefined readings (warm-up NaN) vote neutral.

use crate::domain::{Direction, IndicatorSeries, SeriesError, SignalSeries};

/// Neutral unless both votes agree on a direction.
pub fn conjunction(a: Direction, b: Direction) -> Direction {
    if a == b {
        a
    } else {
        Direction::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalCombiner {
    momentum_lower: f64,
    momentum_upper: f64,
}

impl SignalCombiner {
    pub fn new(momentum_lower: f64, momentum_upper: f64) -> Self {
        assert!(
            momentum_lower < momentum_upper,
            "momentum_lower must be below momentum_upper"
        );
        Self {
            momentum_lower,
            momentum_upper,
        }
    }

    /// Vote from an SMA-ratio reading.
    pub fn sma_vote(sma_ratio: f64) -> Direction {
        Direction::from_sign(-sma_ratio)
    }

    /// Vote from a momentum reading.
    pub fn momentum_vote(&self, momentum: f64) -> Direction {
        if momentum < self.momentum_lower {
            Direction::Short
        } else if momentum > self.momentum_upper {
            Direction::Long
        } else {
            Direction::Neutral
        }
    }

    /// Combined signal for one day.
    pub fn combine_day(&self, sma_ratio: f64, momentum: f64) -> Direction {
        conjunction(Self::sma_vote(sma_ratio), self.momentum_vote(momentum))
    }

    /// Combined signal series. Both inputs must share one trading index.
    pub fn combine(
        &self,
        sma_ratio: &IndicatorSeries,
        momentum: &IndicatorSeries,
    ) -> Result<SignalSeries, SeriesError> {
        sma_ratio.ensure_aligned(momentum)?;
        Ok(self.combine_aligned(sma_ratio, momentum))
    }

    pub(crate) fn combine_aligned(
        &self,
        sma_ratio: &IndicatorSeries,
        momentum: &IndicatorSeries,
    ) -> SignalSeries {
        let signals = sma_ratio
            .values()
            .iter()
            .zip(momentum.values())
            .map(|(&s, &m)| self.combine_day(s, m))
            .collect();
        sma_ratio.with_values(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, TradingIndex};
    use chrono::NaiveDate;

    fn combiner() -> SignalCombiner {
        SignalCombiner::new(-0.07, 0.14)
    }

    fn series(values: Vec<f64>) -> IndicatorSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let index = TradingIndex::new(
            (0..values.len())
                .map(|i| base + chrono::Duration::days(i as i64))
                .collect(),
        )
        .unwrap();
        Series::new(index, values).unwrap()
    }

    #[test]
    fn sma_vote_is_contrarian() {
        assert_eq!(SignalCombiner::sma_vote(-0.02), Direction::Long);
        assert_eq!(SignalCombiner::sma_vote(0.02), Direction::Short);
        assert_eq!(SignalCombiner::sma_vote(0.0), Direction::Neutral);
        assert_eq!(SignalCombiner::sma_vote(f64::NAN), Direction::Neutral);
    }

    #[test]
    fn momentum_vote_uses_thresholds() {
        let c = combiner();
        assert_eq!(c.momentum_vote(-0.08), Direction::Short);
        assert_eq!(c.momentum_vote(-0.07), Direction::Neutral);
        assert_eq!(c.momentum_vote(0.14), Direction::Neutral);
        assert_eq!(c.momentum_vote(0.15), Direction::Long);
        assert_eq!(c.momentum_vote(f64::NAN), Direction::Neutral);
    }

    #[test]
    fn conjunction_requires_agreement() {
        let c = combiner();
        // SMA bullish, momentum neutral → neutral, not bullish.
        assert_eq!(c.combine_day(-0.05, 0.0), Direction::Neutral);
        assert_eq!(c.combine_day(-0.05, 0.2), Direction::Long);
        assert_eq!(c.combine_day(0.05, -0.1), Direction::Short);
        // Opposing votes cancel.
        assert_eq!(c.combine_day(-0.05, -0.1), Direction::Neutral);
    }

    #[test]
    fn warmup_nan_is_neutral() {
        let c = combiner();
        let sma = series(vec![f64::NAN, -0.05, -0.05]);
        let mom = series(vec![0.2, f64::NAN, 0.2]);
        let signals = c.combine(&sma, &mom).unwrap();
        assert_eq!(
            signals.values(),
            &[Direction::Neutral, Direction::Neutral, Direction::Long]
        );
    }

    #[test]
    fn misaligned_inputs_are_rejected() {
        let c = combiner();
        let sma = series(vec![0.1, 0.1]);
        let mom = series(vec![0.1]);
        assert_eq!(c.combine(&sma, &mom), Err(SeriesError::Misaligned));
    }

    #[test]
    fn combining_is_pure() {
        let c = combiner();
        let sma = series(vec![-0.1, 0.1, 0.0, -0.2]);
        let mom = series(vec![0.3, -0.3, 0.3, 0.1]);
        assert_eq!(c.combine(&sma, &mom), c.combine(&sma, &mom));
    }

    #[test]
    #[should_panic(expected = "momentum_lower must be below momentum_upper")]
    fn inverted_thresholds_panic() {
        SignalCombiner::new(0.2, 0.1);
    }
}

//! Rule-based strategy: SMA ratio and momentum, no hindsight.
//!
//! Indicators are computed once over the full history, combined into a raw
//! signal per day, and run through the constrained order scan. Days inside
//! either indicator's warm-up are neutral.

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorSeries, OrderSeries, PriceSeries, SignalSeries};
use crate::indicators::{Indicator, Momentum, SmaRatio};

use super::{constrain, SignalCombiner, Strategy};

/// Parameters of the rule-based strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleBasedParams {
    pub sma_window: usize,
    pub momentum_window: usize,
    pub momentum_lower: f64,
    pub momentum_upper: f64,
}

impl Default for RuleBasedParams {
    fn default() -> Self {
        Self {
            sma_window: 30,
            momentum_window: 40,
            momentum_lower: -0.07,
            momentum_upper: 0.14,
        }
    }
}

/// Per-day intermediate values, for inspection and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBasedReadings {
    pub sma_ratio: IndicatorSeries,
    pub momentum: IndicatorSeries,
    pub sma_vote: SignalSeries,
    pub momentum_vote: SignalSeries,
    pub signal: SignalSeries,
}

#[derive(Debug, Clone)]
pub struct RuleBasedStrategy {
    params: RuleBasedParams,
    sma_ratio: SmaRatio,
    momentum: Momentum,
    combiner: SignalCombiner,
}

impl RuleBasedStrategy {
    /// Panics on invalid parameters; use `create_strategy` to validate first.
    pub fn new(params: RuleBasedParams) -> Self {
        Self {
            params,
            sma_ratio: SmaRatio::new(params.sma_window),
            momentum: Momentum::new(params.momentum_window),
            combiner: SignalCombiner::new(params.momentum_lower, params.momentum_upper),
        }
    }

    pub fn default_params() -> Self {
        Self::new(RuleBasedParams::default())
    }

    pub fn params(&self) -> &RuleBasedParams {
        &self.params
    }

    /// Raw combined signal per day.
    pub fn signals(&self, prices: &PriceSeries) -> SignalSeries {
        let sma_ratio = self.sma_ratio.feed(prices);
        let momentum = self.momentum.feed(prices);
        self.combiner.combine_aligned(&sma_ratio, &momentum)
    }

    /// Indicator readings, individual votes and the combined signal.
    pub fn readings(&self, prices: &PriceSeries) -> RuleBasedReadings {
        let sma_ratio = self.sma_ratio.feed(prices);
        let momentum = self.momentum.feed(prices);
        let sma_vote = sma_ratio.map(|&v| SignalCombiner::sma_vote(v));
        let momentum_vote = momentum.map(|&v| self.combiner.momentum_vote(v));
        let signal = self.combiner.combine_aligned(&sma_ratio, &momentum);
        RuleBasedReadings {
            sma_ratio,
            momentum,
            sma_vote,
            momentum_vote,
            signal,
        }
    }
}

impl Strategy for RuleBasedStrategy {
    fn name(&self) -> &str {
        "rule_based"
    }

    fn warmup_days(&self) -> usize {
        self.sma_ratio.lookback().max(self.momentum.lookback())
    }

    fn generate(&self, prices: &PriceSeries) -> OrderSeries {
        let signals = self.signals(prices);
        tracing::debug!(
            days = prices.len(),
            warmup = self.warmup_days(),
            directional = signals.directional_days(),
            "rule-based signals computed"
        );
        constrain(&signals)
    }
}

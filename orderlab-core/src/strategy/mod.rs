//! Strategies: price history in, position-constrained orders out.
//!
//! Two engines share the same output contract:
//! - `OracleStrategy`: hindsight-optimal orders from forward returns.
//! - `RuleBasedStrategy`: SMA-ratio and momentum signals, combined by
//!   conjunction, then run through the constrained order scan.
//!
//! Both guarantee that the running net position stays within {-1, 0, +1}
//! and that the last day closes any open exposure. Strategies hold only
//! their parameters; every call is independent.

pub mod combiner;
pub mod constrained;
pub mod factory;
pub mod oracle;
pub mod rule_based;

pub use combiner::{conjunction, SignalCombiner};
pub use constrained::constrain;
pub use factory::{create_strategy, rule_based_params, FactoryError};
pub use oracle::{hindsight_opinions, OracleStrategy};
pub use rule_based::{RuleBasedParams, RuleBasedReadings, RuleBasedStrategy};

use crate::domain::{NetPosition, Order, OrderSeries, PriceSeries};

pub trait Strategy: Send + Sync {
    /// Strategy name for manifests and logging (e.g., "oracle").
    fn name(&self) -> &str;

    /// Days of history needed before the strategy can express an opinion.
    fn warmup_days(&self) -> usize;

    /// Generate the order series for one instrument.
    ///
    /// Deterministic: the same prices always yield the same orders.
    fn generate(&self, prices: &PriceSeries) -> OrderSeries;
}

/// Apply `order` to `net`, holding instead if it would leave the ±1 band.
pub(crate) fn step(net: NetPosition, order: Order) -> (Order, NetPosition) {
    match net.apply(order) {
        Some(next) => (order, next),
        None => (Order::Hold, net),
    }
}

/// Force the final day's order to close the exposure carried into it.
///
/// Overrides whatever the signal asked for on that day.
pub(crate) fn flatten_terminal(orders: &mut [Order], carried: NetPosition) {
    let Some(last) = orders.last_mut() else {
        return;
    };
    let closing = carried.closing_order();
    if *last != closing {
        tracing::debug!(
            carried = carried.units(),
            signalled = last.units(),
            forced = closing.units(),
            "terminal flatten overrides final-day order"
        );
    }
    *last = closing;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_refuses_to_leave_band() {
        assert_eq!(
            step(NetPosition::LONG, Order::Buy),
            (Order::Hold, NetPosition::LONG)
        );
        assert_eq!(
            step(NetPosition::LONG, Order::Sell),
            (Order::Sell, NetPosition::FLAT)
        );
    }

    #[test]
    fn flatten_closes_carried_long() {
        let mut orders = vec![Order::Buy, Order::Hold, Order::Hold];
        flatten_terminal(&mut orders, NetPosition::LONG);
        assert_eq!(orders, vec![Order::Buy, Order::Hold, Order::Sell]);
    }

    #[test]
    fn flatten_cancels_final_day_entry() {
        // Flat going into the last day: a signal-driven entry is overridden.
        let mut orders = vec![Order::Hold, Order::Buy];
        flatten_terminal(&mut orders, NetPosition::FLAT);
        assert_eq!(orders, vec![Order::Hold, Order::Hold]);
    }

    #[test]
    fn flatten_empty_is_noop() {
        let mut orders: Vec<Order> = vec![];
        flatten_terminal(&mut orders, NetPosition::SHORT);
        assert!(orders.is_empty());
    }

    #[test]
    fn strategies_are_send_sync() {
        fn require_send_sync<T: Send + Sync>() {}
        require_send_sync::<OracleStrategy>();
        require_send_sync::<RuleBasedStrategy>();
        require_send_sync::<Box<dyn Strategy>>();
    }
}

//! Position-constrained order generation.
//!
//! Turns a raw signal series into a legal order series with a single
//! left-to-right scan. The only state is the net position, carried from one
//! day to the next; whether day t may trade depends on what was actually
//! traded on every earlier day, so the scan cannot be vectorized.

use crate::domain::{Direction, NetPosition, Order, OrderSeries, SignalSeries};

use super::{flatten_terminal, step};

/// Decide one day's order from the carried position and the day's signal.
///
/// A bullish signal buys while there is room to add long exposure, a bearish
/// one sells while there is room to add short exposure, anything else holds.
fn decide(net: NetPosition, signal: Direction) -> Order {
    match signal {
        Direction::Long if net.can_buy() => Order::Buy,
        Direction::Short if net.can_sell() => Order::Sell,
        _ => Order::Hold,
    }
}

/// Convert raw signals into orders that keep net exposure within one unit
/// and end flat.
///
/// Empty and all-neutral inputs are not errors: they yield an empty or
/// all-hold series on the same index.
pub fn constrain(signals: &SignalSeries) -> OrderSeries {
    let mut orders = Vec::with_capacity(signals.len());
    let mut net = NetPosition::FLAT;
    let mut carried = NetPosition::FLAT;

    for &signal in signals.values() {
        carried = net;
        let (order, next) = step(net, decide(net, signal));
        orders.push(order);
        net = next;
    }

    flatten_terminal(&mut orders, carried);
    signals.with_values(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradingIndex;
    use chrono::NaiveDate;

    fn signals(values: &[i64]) -> SignalSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let index = TradingIndex::new(
            (0..values.len())
                .map(|i| base + chrono::Duration::days(i as i64))
                .collect(),
        )
        .unwrap();
        SignalSeries::from_values(index, values).unwrap()
    }

    fn units(orders: &OrderSeries) -> Vec<i8> {
        orders.units()
    }

    #[test]
    fn repeated_bullish_signal_buys_once() {
        let orders = constrain(&signals(&[1, 1, 1, 0]));
        assert_eq!(units(&orders), vec![1, 0, 0, -1]);
    }

    #[test]
    fn bearish_signal_closes_then_opens_short() {
        // Long, then two bearish days: close on the first, go short on the second.
        let orders = constrain(&signals(&[1, -1, -1, 0, 0]));
        assert_eq!(units(&orders), vec![1, -1, -1, 0, 1]);
        assert_eq!(orders.net_positions(), vec![1, 0, -1, -1, 0]);
    }

    #[test]
    fn neutral_days_hold_position() {
        let orders = constrain(&signals(&[-1, 0, 0, 0, 0]));
        assert_eq!(units(&orders), vec![-1, 0, 0, 0, 1]);
    }

    #[test]
    fn final_day_signal_is_overridden() {
        // Flat into the last day; the bullish signal there would open a position.
        let orders = constrain(&signals(&[0, 0, 1]));
        assert_eq!(units(&orders), vec![0, 0, 0]);

        // Long into the last day; a further bullish signal cannot keep it open.
        let orders = constrain(&signals(&[1, 0, 1]));
        assert_eq!(units(&orders), vec![1, 0, -1]);
    }

    #[test]
    fn final_day_bearish_signal_on_long_is_the_close() {
        let orders = constrain(&signals(&[1, -1]));
        assert_eq!(units(&orders), vec![1, -1]);
    }

    #[test]
    fn empty_and_neutral_inputs() {
        assert!(constrain(&signals(&[])).is_empty());
        assert_eq!(units(&constrain(&signals(&[0, 0, 0]))), vec![0, 0, 0]);
        // A single day can never leave a position open.
        assert_eq!(units(&constrain(&signals(&[1]))), vec![0]);
    }

    #[test]
    fn output_shares_signal_index() {
        let sig = signals(&[1, 0, -1]);
        let orders = constrain(&sig);
        assert!(orders.is_aligned_with(&sig));
    }

    #[test]
    fn scan_is_deterministic() {
        let sig = signals(&[1, 1, -1, 0, -1, -1, 1, 0, 1, -1]);
        assert_eq!(constrain(&sig), constrain(&sig));
    }
}

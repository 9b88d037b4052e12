//! Hindsight-optimal strategy.
//!
//! Sees tomorrow's price today. The daily opinion is the direction of the next
//! move; orders are the first difference of the opinion, halved, so a position
//! opens on the first opinion and changes only when the opinion changes.
//!
//! Halving a one-step opinion change (e.g. neutral to bullish) asks for half
//! a unit. Exposure is whole units only, so the scan accumulates the
//! difference in half units and rounds the target position away from zero:
//! half a unit long becomes one unit long. A target two units away is reached
//! one unit per day. Whenever every step is a whole unit this is exactly the
//! halved first difference.

use crate::domain::{Direction, NetPosition, Order, OrderSeries, PriceSeries};

use super::{flatten_terminal, step, Strategy};

/// Direction of each day's next move, for every day but the last.
///
/// The forward return `price[t] / price[t+1] - 1` is negative when tomorrow is
/// higher, so the opinion is its negated sign. Equal prices are neutral.
pub fn hindsight_opinions(prices: &[f64]) -> Vec<Direction> {
    prices
        .windows(2)
        .map(|pair| Direction::from_sign(-(pair[0] / pair[1] - 1.0)))
        .collect()
}

/// Whole-unit target for a half-unit position, rounded away from zero.
fn target_units(half_units: i64) -> i64 {
    half_units.signum() * ((half_units.abs() + 1) / 2)
}

#[derive(Debug, Clone, Default)]
pub struct OracleStrategy;

impl OracleStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for OracleStrategy {
    fn name(&self) -> &str {
        "oracle"
    }

    fn warmup_days(&self) -> usize {
        0
    }

    fn generate(&self, prices: &PriceSeries) -> OrderSeries {
        let opinions = hindsight_opinions(prices.values());
        let mut orders = Vec::with_capacity(prices.len());
        let mut net = NetPosition::FLAT;
        let mut half_units: i64 = 0;
        let mut previous: Option<Direction> = None;

        for &opinion in &opinions {
            half_units += match previous {
                None => 2 * i64::from(opinion.value()),
                Some(prev) => i64::from(opinion.value()) - i64::from(prev.value()),
            };
            previous = Some(opinion);

            let delta = target_units(half_units) - i64::from(net.units());
            if delta.abs() > 1 {
                tracing::debug!(delta, "oracle reversal split across days");
            }
            let wanted = match delta.signum() {
                1 => Order::Buy,
                -1 => Order::Sell,
                _ => Order::Hold,
            };
            let (order, next) = step(net, wanted);
            orders.push(order);
            net = next;
        }

        // The last day has no forward return; it only closes.
        if !prices.is_empty() {
            orders.push(Order::Hold);
        }
        flatten_terminal(&mut orders, net);

        prices.series().with_values(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prices(values: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        PriceSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, &p)| (base + chrono::Duration::days(i as i64), p))
                .collect(),
        )
        .unwrap()
    }

    fn oracle(values: &[f64]) -> Vec<i8> {
        OracleStrategy::new().generate(&prices(values)).units()
    }

    #[test]
    fn monotone_rise_enters_once_and_exits_at_end() {
        assert_eq!(oracle(&[10.0, 11.0, 12.0, 13.0, 14.0]), vec![1, 0, 0, 0, -1]);
    }

    #[test]
    fn monotone_fall_shorts_once() {
        assert_eq!(oracle(&[14.0, 13.0, 12.0, 11.0]), vec![-1, 0, 0, 1]);
    }

    #[test]
    fn opinion_flip_closes_the_position() {
        // Bullish, bearish, bullish: enter, close, re-enter, forced exit.
        assert_eq!(oracle(&[10.0, 11.0, 10.0, 11.0]), vec![1, -1, 1, -1]);
    }

    #[test]
    fn flat_first_day_then_rise_goes_long() {
        assert_eq!(
            oracle(&[10.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0]),
            vec![0, 1, 0, 0, 0, 0, -1]
        );
    }

    #[test]
    fn flat_first_day_then_fall_goes_short() {
        assert_eq!(
            oracle(&[10.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0]),
            vec![0, -1, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn reversal_after_flat_start_is_split() {
        // Opinions: neutral, bullish, bearish, bearish. Long to short takes two days.
        assert_eq!(oracle(&[10.0, 10.0, 11.0, 10.0, 9.0]), vec![0, 1, -1, -1, 1]);
    }

    #[test]
    fn pause_in_trend_keeps_the_position() {
        // Opinions: bullish, neutral, bullish. Half units 2, 1, 2 all round to long.
        assert_eq!(oracle(&[10.0, 11.0, 11.0, 12.0, 13.0]), vec![1, 0, 0, 0, -1]);
    }

    #[test]
    fn target_rounds_half_units_away_from_zero() {
        assert_eq!(
            [-2, -1, 0, 1, 2].map(target_units),
            [-1, -1, 0, 1, 1]
        );
    }

    #[test]
    fn flat_prices_never_trade() {
        assert_eq!(oracle(&[5.0; 6]), vec![0; 6]);
    }

    #[test]
    fn single_day_is_a_single_hold() {
        assert_eq!(oracle(&[42.0]), vec![0]);
    }

    #[test]
    fn empty_prices_give_empty_orders() {
        assert!(oracle(&[]).is_empty());
    }

    #[test]
    fn two_days_open_and_close() {
        assert_eq!(oracle(&[10.0, 9.0]), vec![-1, 1]);
    }

    #[test]
    fn opinions_follow_next_move() {
        assert_eq!(
            hindsight_opinions(&[10.0, 11.0, 11.0, 9.0]),
            vec![Direction::Long, Direction::Neutral, Direction::Short]
        );
    }
}

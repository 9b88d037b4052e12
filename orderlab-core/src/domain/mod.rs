//! Domain types for OrderLab

pub mod direction;
pub mod ids;
pub mod order;
pub mod series;

pub use direction::{Direction, SignalSeries};
pub use ids::{ConfigHash, DatasetHash};
pub use order::{NetPosition, Order, OrderSeries};
pub use series::{IndicatorSeries, PriceSeries, Series, SeriesError, TradingIndex};

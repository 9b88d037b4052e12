//! Strategy runner: wires together price loading, strategies, and validation.
//!
//! Entry points:
//! - `run_single()`: one instrument, pre-loaded prices. No I/O.
//! - `run_batch()`: many instruments, loaded and run in parallel.
//! - `run_files()`: standalone price files, run in parallel.
//!
//! Artifacts are keyed by symbol, so a batch never holds the same symbol twice.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderlab_core::config::{ConfigError, StrategyConfig};
use orderlab_core::domain::{ConfigHash, DatasetHash, OrderSeries};
use orderlab_core::strategy::{create_strategy, FactoryError, Strategy};
use orderlab_core::validation::{validate_orders, ValidationError};

use crate::data_loader::{
    file_symbol, load_price_file_between, load_prices, DataSource, LoadError, LoadOptions,
    LoadedPrices,
};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("symbol '{0}' appears more than once; its artifacts would overwrite each other")]
    DuplicateSymbol(String),
    #[error("generated orders for '{symbol}' are invalid: {source}")]
    InvalidOrders {
        symbol: String,
        #[source]
        source: ValidationError,
    },
}

/// Trade statistics for one order series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub days: usize,
    pub warmup_days: usize,
    pub buys: usize,
    pub sells: usize,
    /// Flat → long or flat → short.
    pub entries: usize,
    /// Long → flat or short → flat.
    pub exits: usize,
    /// Entries opposite to the previously closed position.
    pub reversals: usize,
    /// Longest run of consecutive days ending with an open position.
    pub max_holding_days: usize,
    /// The last day closed a position that was still open.
    pub forced_exit: bool,
}

impl RunSummary {
    pub fn from_orders(orders: &OrderSeries, warmup_days: usize) -> Self {
        let mut summary = RunSummary {
            days: orders.len(),
            warmup_days,
            ..RunSummary::default()
        };

        let mut net = 0_i64;
        let mut last_side = 0_i64;
        let mut holding = 0_usize;
        for order in orders.values() {
            let before = net;
            net += i64::from(order.units());
            match order.units() {
                1 => summary.buys += 1,
                -1 => summary.sells += 1,
                _ => {}
            }
            if before == 0 && net != 0 {
                summary.entries += 1;
                if last_side != 0 && net != last_side {
                    summary.reversals += 1;
                }
            }
            if before != 0 && net == 0 {
                summary.exits += 1;
                last_side = before;
            }
            holding = if net != 0 { holding + 1 } else { 0 };
            summary.max_holding_days = summary.max_holding_days.max(holding);
        }

        summary.forced_exit = orders.last().is_some_and(|o| o.is_trade());
        summary
    }
}

/// Complete result of running one strategy on one instrument.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub symbol: String,
    pub strategy: String,
    pub config: StrategyConfig,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub source: DataSource,
    pub orders: OrderSeries,
    pub summary: RunSummary,
}

/// Run a strategy on pre-loaded prices.
pub fn run_single(config: &StrategyConfig, loaded: &LoadedPrices) -> Result<RunResult, RunError> {
    let strategy = create_strategy(config)?;
    run_with_strategy(strategy.as_ref(), config, loaded)
}

/// Run an already-built strategy on pre-loaded prices: no I/O.
pub fn run_with_strategy(
    strategy: &dyn Strategy,
    config: &StrategyConfig,
    loaded: &LoadedPrices,
) -> Result<RunResult, RunError> {
    let orders = strategy.generate(&loaded.prices);
    validate_orders(&orders).map_err(|source| RunError::InvalidOrders {
        symbol: loaded.symbol.clone(),
        source,
    })?;

    let summary = RunSummary::from_orders(&orders, strategy.warmup_days());
    tracing::info!(
        symbol = %loaded.symbol,
        strategy = strategy.name(),
        days = summary.days,
        entries = summary.entries,
        exits = summary.exits,
        source = %loaded.source,
        "run complete"
    );

    Ok(RunResult {
        symbol: loaded.symbol.clone(),
        strategy: strategy.name().to_string(),
        config: config.clone(),
        config_hash: config.config_hash(),
        dataset_hash: loaded.dataset_hash.clone(),
        source: loaded.source.clone(),
        orders,
        summary,
    })
}

/// Load and run every symbol in parallel.
///
/// The strategy is built once up front, so a bad configuration fails the
/// whole batch. Per-symbol failures (missing data) are returned in place;
/// results keep the order of `symbols`.
pub fn run_batch(
    config: &StrategyConfig,
    symbols: &[String],
    opts: &LoadOptions,
) -> Result<Vec<(String, Result<RunResult, RunError>)>, RunError> {
    let strategy = create_strategy(config)?;
    ensure_unique_symbols(symbols.iter().map(String::as_str))?;
    tracing::info!(
        strategy = strategy.name(),
        symbols = symbols.len(),
        "starting batch"
    );

    let results = symbols
        .par_iter()
        .map(|symbol| {
            let result = load_prices(symbol, opts)
                .map_err(RunError::from)
                .and_then(|loaded| run_with_strategy(strategy.as_ref(), config, &loaded));
            if let Err(e) = &result {
                tracing::warn!(symbol = %symbol, error = %e, "symbol failed");
            }
            (symbol.clone(), result)
        })
        .collect();

    Ok(results)
}

/// Load and run standalone price files in parallel, each clipped to the bounds.
///
/// The symbol is the file stem. Two files with the same stem are rejected
/// before anything is loaded. Results keep the order of `paths`, labelled by path.
pub fn run_files(
    config: &StrategyConfig,
    paths: &[PathBuf],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<(String, Result<RunResult, RunError>)>, RunError> {
    let strategy = create_strategy(config)?;
    let symbols: Vec<String> = paths.iter().map(|p| file_symbol(p)).collect();
    ensure_unique_symbols(symbols.iter().map(String::as_str))?;
    tracing::info!(strategy = strategy.name(), files = paths.len(), "starting file batch");

    let results = paths
        .par_iter()
        .map(|path| {
            let result = load_price_file_between(path, start, end)
                .map_err(RunError::from)
                .and_then(|loaded| run_with_strategy(strategy.as_ref(), config, &loaded));
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "file failed");
            }
            (path.display().to_string(), result)
        })
        .collect();

    Ok(results)
}

/// Reject the first symbol that repeats.
pub fn ensure_unique_symbols<'a>(
    symbols: impl IntoIterator<Item = &'a str>,
) -> Result<(), RunError> {
    let mut seen = HashSet::new();
    for symbol in symbols {
        if !seen.insert(symbol) {
            return Err(RunError::DuplicateSymbol(symbol.to_string()));
        }
    }
    Ok(())
}

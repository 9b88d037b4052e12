//! OrderLab Runner: price loading, strategy runs, artifacts.
//!
//! This crate builds on `orderlab-core` to provide:
//! - Price loading from CSV with a synthetic fallback
//! - Single-instrument runs with order validation and trade summaries
//! - Parallel batch runs over many instruments
//! - Order tape and manifest export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{RunConfig, RunSection};
pub use data_loader::{
    file_symbol, generate_synthetic_prices, load_price_file, load_price_file_between, load_prices,
    read_price_csv, DataSource, LoadError, LoadOptions, LoadedPrices,
};
pub use export::{read_orders_csv, save_artifacts, RunManifest};
pub use runner::{
    ensure_unique_symbols, run_batch, run_files, run_single, run_with_strategy, RunError,
    RunResult, RunSummary,
};

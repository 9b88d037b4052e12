//! OrderLab CLI: run strategies, validate order files, inspect signals.
//!
//! Commands:
//! - `run`: generate orders for price files, symbols, or a TOML run config
//! - `validate`: check an order file for the position bound and terminal flatness
//! - `signals`: print the rule-based strategy's per-day readings for a price file

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orderlab_core::config::StrategyConfig;
use orderlab_core::strategy::{rule_based_params, RuleBasedStrategy};
use orderlab_core::validation::validate_orders;
use orderlab_runner::{
    load_price_file, read_orders_csv, run_batch, run_files, save_artifacts, RunConfig, RunError,
    RunResult, RunSummary,
};

#[derive(Parser)]
#[command(
    name = "orderlab",
    about = "OrderLab CLI: oracle and rule-based daily order generation"
)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate orders and save artifacts.
    Run {
        /// Path to a TOML run config ([run] + [strategy]).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy: oracle or rule_based. Defaults to rule_based.
        #[arg(long)]
        strategy: Option<String>,

        /// Strategy parameter override, e.g. --param sma_window=20. Repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Price CSV files (date,price). Each file is one instrument, named by its file stem.
        #[arg(long, num_args = 1..)]
        prices: Vec<PathBuf>,

        /// Symbols to load from --data-dir (e.g., SPY QQQ).
        #[arg(long, num_args = 1..)]
        symbol: Vec<String>,

        /// Directory holding {symbol}.csv files. Defaults to the current directory.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Use synthetic prices when a symbol has no file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// First date (YYYY-MM-DD) to keep from symbols or price files.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD) to keep from symbols or price files.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory for orders.csv and manifest.json.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Check an order file (date,order) for legality.
    Validate {
        /// Path to an orders CSV.
        #[arg(long)]
        orders: PathBuf,
    },
    /// Print rule-based indicator readings and signals for a price file.
    Signals {
        /// Price CSV file (date,price).
        #[arg(long)]
        prices: PathBuf,

        /// Rule-based parameter override, e.g. --param momentum_window=20. Repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Run {
            config,
            strategy,
            params,
            prices,
            symbol,
            data_dir,
            synthetic,
            start,
            end,
            output_dir,
        } => run_cmd(RunArgs {
            config,
            strategy,
            params,
            prices,
            symbols: symbol,
            data_dir,
            synthetic,
            start,
            end,
            output_dir,
        }),
        Commands::Validate { orders } => validate_cmd(&orders),
        Commands::Signals { prices, params } => signals_cmd(&prices, params),
    }
}

/// Install the tracing subscriber. Logs go to stderr so stdout stays parseable.
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for {key}: {e}"))?;
    Ok((key.trim().to_string(), value))
}

struct RunArgs {
    config: Option<PathBuf>,
    strategy: Option<String>,
    params: Vec<(String, f64)>,
    prices: Vec<PathBuf>,
    symbols: Vec<String>,
    data_dir: Option<PathBuf>,
    synthetic: bool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output_dir: Option<PathBuf>,
}

fn run_cmd(args: RunArgs) -> Result<()> {
    if args.config.is_some() && args.strategy.is_some() {
        bail!("--config and --strategy are mutually exclusive");
    }
    if !args.prices.is_empty() && !args.symbols.is_empty() {
        bail!("--prices and --symbol are mutually exclusive");
    }

    // Build the run config: from file, or from flags.
    let mut run_config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => {
            let mut defaults = RunConfig::from_toml(
                "[run]\nsymbols = [\"SPY\"]\n\n[strategy]\nstrategy_type = \"rule_based\"\n",
            )?;
            if let Some(name) = &args.strategy {
                defaults.strategy = StrategyConfig::new(name.as_str());
            }
            defaults
        }
    };
    for (key, value) in &args.params {
        run_config.strategy.params.insert(key.clone(), *value);
    }
    if !args.symbols.is_empty() {
        run_config.run.symbols = args.symbols.clone();
    }
    if let Some(dir) = &args.data_dir {
        run_config.run.data_dir = Some(dir.clone());
    }
    if args.synthetic {
        run_config.run.synthetic = true;
    }
    if let Some(start) = args.start {
        run_config.run.start = start;
    }
    if let Some(end) = args.end {
        run_config.run.end = end;
    }
    if let Some(dir) = &args.output_dir {
        run_config.run.output_dir = dir.clone();
    }
    run_config.validate()?;

    let strategy = &run_config.strategy;
    println!(
        "Strategy: {} (config {})",
        strategy.strategy_type,
        &strategy.config_hash().0[..12]
    );

    let outcomes: Vec<(String, Result<RunResult, RunError>)> = if args.prices.is_empty() {
        run_batch(strategy, &run_config.run.symbols, &run_config.load_options())?
    } else {
        run_files(strategy, &args.prices, args.start, args.end)?
    };

    let mut failures = 0;
    for (label, outcome) in &outcomes {
        match outcome {
            Ok(result) => {
                print_summary(result);
                let dir = save_artifacts(result, &run_config.run.output_dir)?;
                println!("  artifacts: {}", dir.display());
            }
            Err(e) => {
                failures += 1;
                eprintln!("Error for {label}: {e}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} instruments failed", outcomes.len());
    }
    Ok(())
}

fn print_summary(result: &RunResult) {
    let s: &RunSummary = &result.summary;
    println!();
    println!(
        "{} [{}] data {} ({})",
        result.symbol,
        result.strategy,
        result.dataset_hash.short(),
        result.source
    );
    println!(
        "  days {:>6}   warm-up {:>4}   buys {:>4}   sells {:>4}",
        s.days, s.warmup_days, s.buys, s.sells
    );
    println!(
        "  entries {:>3}   exits {:>3}   reversals {:>3}   max hold {:>4}d   forced exit {}",
        s.entries,
        s.exits,
        s.reversals,
        s.max_holding_days,
        if s.forced_exit { "yes" } else { "no" }
    );
}

fn validate_cmd(path: &Path) -> Result<()> {
    let orders = read_orders_csv(path)?;
    validate_orders(&orders)
        .with_context(|| format!("{} is not a legal order series", path.display()))?;
    let summary = RunSummary::from_orders(&orders, 0);
    println!(
        "OK: {} days, {} trades, {} round trips, net position always within one unit, ends flat",
        summary.days,
        orders.trade_count(),
        summary.exits
    );
    Ok(())
}

fn signals_cmd(path: &Path, params: Vec<(String, f64)>) -> Result<()> {
    let mut config = StrategyConfig::rule_based();
    config.params.extend(params);
    let strategy = RuleBasedStrategy::new(rule_based_params(&config)?);

    let loaded = load_price_file(path)?;
    let readings = strategy.readings(&loaded.prices);

    println!("date,price,sma_ratio,momentum,sma_vote,momentum_vote,signal");
    let days = loaded
        .prices
        .iter()
        .zip(readings.sma_ratio.values())
        .zip(readings.momentum.values())
        .zip(readings.sma_vote.values())
        .zip(readings.momentum_vote.values())
        .zip(readings.signal.values());
    for ((((((date, price), sma), mom), sma_vote), mom_vote), signal) in days {
        println!(
            "{date},{price},{},{},{},{},{}",
            fmt_reading(*sma),
            fmt_reading(*mom),
            sma_vote.value(),
            mom_vote.value(),
            signal.value()
        );
    }
    Ok(())
}

fn fmt_reading(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        format!("{x:.6}")
    }
}

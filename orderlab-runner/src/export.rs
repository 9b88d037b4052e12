//! Artifact export: order tape CSV and run manifest JSON.
//!
//! Each run is saved under `{output_dir}/{symbol}/`:
//! - `orders.csv`: `date,order` with order in {-1, 0, 1}
//! - `manifest.json`: provenance and summary (`RunManifest`)
//!
//! All manifests carry a `schema_version`. Unknown versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use orderlab_core::config::StrategyConfig;
use orderlab_core::domain::{ConfigHash, DatasetHash, OrderSeries, TradingIndex};

use crate::data_loader::DataSource;
use crate::runner::{RunResult, RunSummary};

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub symbol: String,
    pub strategy: String,
    pub config: StrategyConfig,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub source: DataSource,
    pub synthetic: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub summary: RunSummary,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl RunManifest {
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: result.symbol.clone(),
            strategy: result.strategy.clone(),
            config: result.config.clone(),
            config_hash: result.config_hash.clone(),
            dataset_hash: result.dataset_hash.clone(),
            source: result.source.clone(),
            synthetic: result.source.is_synthetic(),
            start_date: result.orders.index().first(),
            end_date: result.orders.index().last(),
            summary: result.summary.clone(),
            generated_at: chrono::Utc::now(),
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_manifest_json(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize run manifest")
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest_json(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export an order series as `date,order` CSV.
pub fn export_orders_csv(orders: &OrderSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "order"])?;
    for (date, order) in orders.iter() {
        wtr.write_record([date.to_string(), order.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse a `date,order` CSV back into an order series.
///
/// Rows must already be in strictly increasing date order, and every order
/// must be -1, 0 or 1. Position-bound checks are left to `validate_orders`.
pub fn import_orders_csv(text: &str) -> Result<OrderSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut dates = Vec::new();
    let mut values = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV record {}", i + 1))?;
        let (Some(date), Some(order)) = (record.get(0), record.get(1)) else {
            bail!("record {} needs date and order columns", i + 1);
        };
        dates.push(
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("record {}: bad date '{date}'", i + 1))?,
        );
        values.push(
            order
                .parse::<i64>()
                .with_context(|| format!("record {}: bad order '{order}'", i + 1))?,
        );
    }

    let index = TradingIndex::new(dates)?;
    Ok(OrderSeries::from_values(index, &values)?)
}

pub fn read_orders_csv(path: &Path) -> Result<OrderSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_orders_csv(&text).with_context(|| format!("invalid order file {}", path.display()))
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save `orders.csv` and `manifest.json` under `{output_dir}/{symbol}/`.
///
/// Returns the path to the symbol directory.
pub fn save_artifacts(result: &RunResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&result.symbol);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let orders_csv = export_orders_csv(&result.orders)?;
    std::fs::write(run_dir.join("orders.csv"), orders_csv)?;

    let json = export_manifest_json(&RunManifest::from_result(result))?;
    std::fs::write(run_dir.join("manifest.json"), json)?;

    tracing::debug!(dir = %run_dir.display(), "artifacts written");
    Ok(run_dir)
}

/// Load the manifest from an artifact directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_manifest_json(&json)
}

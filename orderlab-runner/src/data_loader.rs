//! Price loading for the runner.
//!
//! Given a symbol, loads adjusted closes from `{data_dir}/{symbol}.csv`.
//! Fallback policy:
//! 1. If the CSV exists → load it and clip it to the requested date range
//! 2. If not and `synthetic` → generate a synthetic random walk (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only debug mode. Runs on synthetic prices
//! are tagged in their manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderlab_core::domain::{DatasetHash, PriceSeries, SeriesError, TradingIndex};

/// Accepted header names for the date column.
const DATE_HEADERS: [&str; 2] = ["date", "Date"];
/// Accepted header names for the price column, in order of preference.
const PRICE_HEADERS: [&str; 4] = ["price", "adj_close", "Adj Close", "Close"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no price file for '{symbol}' at {path} (use --synthetic for synthetic data)")]
    NoData { symbol: String, path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing {column} column")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path} line {line}: {reason}")]
    BadRow {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("{path}: duplicate date {date}")]
    DuplicateDate { path: String, date: NaiveDate },

    #[error("{path}: {source}")]
    Series {
        path: String,
        #[source]
        source: SeriesError,
    },
}

/// Where a symbol's prices came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum DataSource {
    Csv(PathBuf),
    Synthetic,
}

impl DataSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataSource::Synthetic)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Csv(path) => write!(f, "csv:{}", path.display()),
            DataSource::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Directory holding `{symbol}.csv` files.
    pub data_dir: Option<PathBuf>,
    /// First date kept (inclusive).
    pub start: NaiveDate,
    /// Last date kept (inclusive).
    pub end: NaiveDate,
    /// Generate synthetic prices when no file is available.
    pub synthetic: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_dir: None,
            start: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            synthetic: false,
        }
    }
}

/// Prices for one symbol, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub symbol: String,
    pub prices: PriceSeries,
    pub source: DataSource,
    /// BLAKE3 over every date and price.
    pub dataset_hash: DatasetHash,
}

impl LoadedPrices {
    pub fn new(symbol: impl Into<String>, prices: PriceSeries, source: DataSource) -> Self {
        let dataset_hash = DatasetHash::of_prices(&prices);
        Self {
            symbol: symbol.into(),
            prices,
            source,
            dataset_hash,
        }
    }
}

/// Load prices for a symbol, falling back to synthetic data if allowed.
pub fn load_prices(symbol: &str, opts: &LoadOptions) -> Result<LoadedPrices, LoadError> {
    let path = opts
        .data_dir
        .as_deref()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{symbol}.csv"));

    if path.is_file() {
        let prices = clip(&read_price_csv(&path)?, opts.start, opts.end).map_err(|source| {
            LoadError::Series {
                path: path.display().to_string(),
                source,
            }
        })?;
        tracing::debug!(symbol, path = %path.display(), days = prices.len(), "loaded prices");
        return Ok(LoadedPrices::new(symbol, prices, DataSource::Csv(path)));
    }

    if opts.synthetic {
        tracing::warn!(
            symbol,
            "generating synthetic prices; results will be tagged as synthetic"
        );
        let prices = generate_synthetic_prices(symbol, opts.start, opts.end).map_err(|source| {
            LoadError::Series {
                path: format!("synthetic:{symbol}"),
                source,
            }
        })?;
        return Ok(LoadedPrices::new(symbol, prices, DataSource::Synthetic));
    }

    Err(LoadError::NoData {
        symbol: symbol.to_string(),
        path: path.display().to_string(),
    })
}

/// Symbol for a standalone price file: its file stem.
pub fn file_symbol(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "prices".to_string())
}

/// Load a single price file, tagged with its file stem as the symbol.
pub fn load_price_file(path: &Path) -> Result<LoadedPrices, LoadError> {
    load_price_file_between(path, None, None)
}

/// Load a single price file, keeping only days inside the given bounds.
pub fn load_price_file_between(
    path: &Path,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<LoadedPrices, LoadError> {
    let mut prices = read_price_csv(path)?;
    if start.is_some() || end.is_some() {
        prices = clip(
            &prices,
            start.unwrap_or(NaiveDate::MIN),
            end.unwrap_or(NaiveDate::MAX),
        )
        .map_err(|source| LoadError::Series {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(LoadedPrices::new(
        file_symbol(path),
        prices,
        DataSource::Csv(path.to_path_buf()),
    ))
}

/// Read a `date,price` CSV into a price series.
///
/// Rows may be in any order; they are sorted by date. Duplicate dates and
/// non-positive prices are rejected.
pub fn read_price_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    parse_price_csv(file, &display)
}

fn parse_price_csv<R: std::io::Read>(reader: R, path: &str) -> Result<PriceSeries, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_string(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let find = |names: &[&str]| names.iter().find_map(|n| headers.iter().position(|h| h == *n));
    let date_col = find(&DATE_HEADERS).ok_or(LoadError::MissingColumn {
        path: path.to_string(),
        column: "date",
    })?;
    let price_col = find(&PRICE_HEADERS).ok_or(LoadError::MissingColumn {
        path: path.to_string(),
        column: "price",
    })?;

    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let bad_row = |reason: String| LoadError::BadRow {
            path: path.to_string(),
            line,
            reason,
        };

        let date_str = record.get(date_col).unwrap_or("");
        let price_str = record.get(price_col).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| bad_row(format!("bad date '{date_str}': {e}")))?;
        let price: f64 = price_str
            .parse()
            .map_err(|e| bad_row(format!("bad price '{price_str}': {e}")))?;
        rows.push((date, price));
    }

    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(LoadError::DuplicateDate {
            path: path.to_string(),
            date: pair[0].0,
        });
    }

    PriceSeries::from_pairs(rows).map_err(|source| LoadError::Series {
        path: path.to_string(),
        source,
    })
}

/// Keep only days in `[start, end]`.
fn clip(prices: &PriceSeries, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries, SeriesError> {
    let pairs = prices
        .iter()
        .filter(|(date, _)| *date >= start && *date <= end)
        .map(|(date, &price)| (date, price))
        .collect();
    PriceSeries::from_pairs(pairs)
}

/// Generate synthetic prices for testing/development.
///
/// A random walk from 100.0 over weekdays in `[start, end]`, seeded from the
/// symbol name so the same symbol always yields the same path.
pub fn generate_synthetic_prices(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut dates = Vec::new();
    let mut prices = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            dates.push(current);
            prices.push(price);
        }
        current += chrono::Duration::days(1);
    }

    PriceSeries::new(TradingIndex::new(dates)?, prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<PriceSeries, LoadError> {
        parse_price_csv(text.as_bytes(), "test.csv")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_date_price_columns() {
        let prices = parse("date,price\n2024-01-02,100.5\n2024-01-03,101\n").unwrap();
        assert_eq!(prices.values(), &[100.5, 101.0]);
        assert_eq!(prices.index().first(), Some(day(2024, 1, 2)));
    }

    #[test]
    fn prefers_adjusted_close_in_ohlc_files() {
        let text = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                    2024-01-02,10,11,9,10.5,10.25,100\n";
        let prices = parse(text).unwrap();
        assert_eq!(prices.values(), &[10.25]);
    }

    #[test]
    fn sorts_rows_by_date() {
        let prices = parse("date,price\n2024-01-03,2\n2024-01-02,1\n").unwrap();
        assert_eq!(prices.values(), &[1.0, 2.0]);
    }

    #[test]
    fn rejects_duplicates_and_bad_rows() {
        assert!(matches!(
            parse("date,price\n2024-01-02,1\n2024-01-02,2\n"),
            Err(LoadError::DuplicateDate { .. })
        ));
        assert!(matches!(
            parse("date,price\n2024-13-02,1\n"),
            Err(LoadError::BadRow { .. })
        ));
        assert!(matches!(
            parse("date,price\n2024-01-02,abc\n"),
            Err(LoadError::BadRow { .. })
        ));
        assert!(matches!(
            parse("date,price\n2024-01-02,-3\n"),
            Err(LoadError::Series { .. })
        ));
        assert!(matches!(
            parse("day,value\n2024-01-02,1\n"),
            Err(LoadError::MissingColumn { column: "date", .. })
        ));
    }

    #[test]
    fn synthetic_prices_are_deterministic_per_symbol() {
        let (start, end) = (day(2024, 1, 1), day(2024, 3, 31));
        let a = generate_synthetic_prices("SPY", start, end).unwrap();
        let b = generate_synthetic_prices("SPY", start, end).unwrap();
        let c = generate_synthetic_prices("QQQ", start, end).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.values(), c.values());
        assert!(a.iter().all(|(d, _)| d.weekday().number_from_monday() <= 5));
    }

    #[test]
    fn missing_file_without_synthetic_fails() {
        let opts = LoadOptions {
            data_dir: Some(PathBuf::from("/nonexistent/prices")),
            ..LoadOptions::default()
        };
        assert!(matches!(
            load_prices("SPY", &opts),
            Err(LoadError::NoData { .. })
        ));
    }

    #[test]
    fn missing_file_with_synthetic_falls_back() {
        let opts = LoadOptions {
            data_dir: Some(PathBuf::from("/nonexistent/prices")),
            synthetic: true,
            ..LoadOptions::default()
        };
        let loaded = load_prices("SPY", &opts).unwrap();
        assert!(loaded.source.is_synthetic());
        assert_eq!(loaded.dataset_hash, DatasetHash::of_prices(&loaded.prices));
    }

    #[test]
    fn price_file_bounds_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("QQQ.csv");
        std::fs::write(
            &path,
            "date,price\n2024-01-02,10\n2024-01-03,11\n2024-01-04,12\n2024-01-05,13\n",
        )
        .unwrap();

        let full = load_price_file(&path).unwrap();
        assert_eq!(full.symbol, "QQQ");
        assert_eq!(full.prices.len(), 4);

        let tail = load_price_file_between(&path, Some(day(2024, 1, 4)), None).unwrap();
        assert_eq!(tail.prices.values(), &[12.0, 13.0]);
        assert_ne!(tail.dataset_hash, full.dataset_hash);

        let middle =
            load_price_file_between(&path, Some(day(2024, 1, 3)), Some(day(2024, 1, 4))).unwrap();
        assert_eq!(middle.prices.values(), &[11.0, 12.0]);
    }
}

//! Run configuration loaded from TOML.
//!
//! ```toml
//! [run]
//! symbols = ["SPY", "QQQ"]
//! data_dir = "data"
//! output_dir = "output"
//! synthetic = false
//! start = "2020-01-02"
//! end = "2024-12-31"
//!
//! [strategy]
//! strategy_type = "rule_based"
//!
//! [strategy.params]
//! sma_window = 30
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use orderlab_core::config::{ConfigError, StrategyConfig};
use orderlab_core::domain::ConfigHash;

use crate::data_loader::LoadOptions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub run: RunSection,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSection {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub synthetic: bool,
    #[serde(default = "default_start")]
    pub start: NaiveDate,
    #[serde(default = "default_end")]
    pub end: NaiveDate,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_start() -> NaiveDate {
    LoadOptions::default().start
}

fn default_end() -> NaiveDate {
    LoadOptions::default().end
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.symbols.is_empty() {
            return Err(ConfigError::Invalid("run.symbols must not be empty".into()));
        }
        if self.run.start > self.run.end {
            return Err(ConfigError::Invalid(format!(
                "run.start {} is after run.end {}",
                self.run.start, self.run.end
            )));
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            data_dir: self.run.data_dir.clone(),
            start: self.run.start,
            end: self.run.end,
            synthetic: self.run.synthetic,
        }
    }

    /// Fingerprint of the strategy configuration.
    pub fn config_hash(&self) -> ConfigHash {
        self.strategy.config_hash()
    }
}

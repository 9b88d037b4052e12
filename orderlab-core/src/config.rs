//! Strategy configuration and its fingerprint.
//!
//! A strategy is named by `strategy_type` and tuned by a flat map of numeric
//! parameters. `BTreeMap` keeps key order deterministic, so the same
//! configuration always hashes the same.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ConfigHash;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    pub strategy_type: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl StrategyConfig {
    pub fn new(strategy_type: impl Into<String>) -> Self {
        Self {
            strategy_type: strategy_type.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn oracle() -> Self {
        Self::new("oracle")
    }

    /// Rule-based strategy with default windows and thresholds.
    pub fn rule_based() -> Self {
        Self::new("rule_based")
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Hash of the strategy type and every parameter value.
    ///
    /// Parameters are written in key order with their exact bit patterns.
    pub fn config_hash(&self) -> ConfigHash {
        let mut canonical = self.strategy_type.clone();
        for (name, value) in &self.params {
            canonical.push_str(&format!("|{name}={:016x}", value.to_bits()));
        }
        ConfigHash::from_bytes(canonical.as_bytes())
    }
}

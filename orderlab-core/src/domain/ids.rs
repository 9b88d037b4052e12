use serde::{Deserialize, Serialize};
use std::fmt;

use super::series::PriceSeries;

/// Deterministic strategy configuration hash (BLAKE3 over type and parameters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic dataset hash (BLAKE3 over every date and price).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of_prices(prices: &PriceSeries) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (date, price) in prices.iter() {
            hasher.update(date.to_string().as_bytes());
            hasher.update(&price.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

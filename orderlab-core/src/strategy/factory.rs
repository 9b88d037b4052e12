//! Factory: converts a `StrategyConfig` into a runtime strategy.

use crate::config::StrategyConfig;

use super::{OracleStrategy, RuleBasedParams, RuleBasedStrategy, Strategy};

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("Unknown strategy type: {0}")]
    UnknownStrategy(String),
    #[error("Unknown parameter for {strategy}: {param}")]
    UnknownParam { strategy: String, param: String },
    #[error("Invalid parameter {param}: {reason}")]
    InvalidParam { param: String, reason: String },
}

const RULE_BASED_PARAMS: [&str; 4] = [
    "sma_window",
    "momentum_window",
    "momentum_lower",
    "momentum_upper",
];

// ─── Helpers ─────────────────────────────────────────────────────────

fn invalid(param: &str, reason: impl Into<String>) -> FactoryError {
    FactoryError::InvalidParam {
        param: param.to_string(),
        reason: reason.into(),
    }
}

/// Named finite f64 parameter, falling back to `default`.
fn param(config: &StrategyConfig, name: &str, default: f64) -> Result<f64, FactoryError> {
    match config.params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(invalid(name, format!("{v} is not finite"))),
    }
}

/// Named window length: a whole number of at least one day.
fn param_usize(config: &StrategyConfig, name: &str, default: usize) -> Result<usize, FactoryError> {
    match config.params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() && v.fract() == 0.0 && v >= 1.0 => Ok(v as usize),
        Some(v) => Err(invalid(name, format!("{v} is not a positive whole number"))),
    }
}

fn reject_unknown(config: &StrategyConfig, allowed: &[&str]) -> Result<(), FactoryError> {
    match config.params.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(unknown) => Err(FactoryError::UnknownParam {
            strategy: config.strategy_type.clone(),
            param: unknown.clone(),
        }),
        None => Ok(()),
    }
}

/// Validated rule-based parameters, defaults filled in.
pub fn rule_based_params(config: &StrategyConfig) -> Result<RuleBasedParams, FactoryError> {
    reject_unknown(config, &RULE_BASED_PARAMS)?;
    let defaults = RuleBasedParams::default();
    let params = RuleBasedParams {
        sma_window: param_usize(config, "sma_window", defaults.sma_window)?,
        momentum_window: param_usize(config, "momentum_window", defaults.momentum_window)?,
        momentum_lower: param(config, "momentum_lower", defaults.momentum_lower)?,
        momentum_upper: param(config, "momentum_upper", defaults.momentum_upper)?,
    };
    if params.momentum_lower >= params.momentum_upper {
        return Err(invalid(
            "momentum_lower",
            format!(
                "{} must be below momentum_upper {}",
                params.momentum_lower, params.momentum_upper
            ),
        ));
    }
    Ok(params)
}

// ─── Strategy factory ────────────────────────────────────────────────

pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    match config.strategy_type.as_str() {
        "oracle" => {
            reject_unknown(config, &[])?;
            Ok(Box::new(OracleStrategy::new()))
        }
        "rule_based" => Ok(Box::new(RuleBasedStrategy::new(rule_based_params(config)?))),
        other => Err(FactoryError::UnknownStrategy(other.to_string())),
    }
}

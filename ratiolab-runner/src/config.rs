//! Serializable run configuration.
//!
//! A run is fully described by one TOML file:
//!
//! ```toml
//! [env]
//! cash = 100000.0
//! fee = 0.001
//!
//! [data]
//! source = "synthetic"
//! symbols = ["AAA", "BBB"]
//! start = "2024-01-01"
//! days = 252
//! seed = 42
//!
//! [strategy]
//! weights = [0.6, 0.4]
//! rebalance_every = 5
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ratiolab_core::engine::{ActionParams, EnvConfig};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("data.symbols must not be empty")]
    NoSymbols,
    #[error("strategy.{field} has {found} entries, expected one per symbol ({expected})")]
    WeightArity {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("strategy.rebalance_every must be at least 1")]
    ZeroRebalance,
    #[error("data.days must be at least 2 for a synthetic run")]
    TooFewSyntheticDays,
}

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub env: EnvConfig,
    pub data: DataConfig,
    pub strategy: StrategyConfig,
}

/// Where the price data comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataConfig {
    /// One `{dir}/{symbol}.csv` file per symbol.
    Csv { dir: PathBuf, symbols: Vec<String> },
    /// Deterministic random walks.
    Synthetic {
        symbols: Vec<String>,
        start: NaiveDate,
        days: usize,
        #[serde(default)]
        seed: u64,
    },
}

impl DataConfig {
    pub fn symbols(&self) -> &[String] {
        match self {
            DataConfig::Csv { symbols, .. } | DataConfig::Synthetic { symbols, .. } => symbols,
        }
    }
}

/// Constant-weight rebalancing schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    /// Target weight per symbol, in `data.symbols` order.
    pub weights: Vec<f64>,
    #[serde(default)]
    pub cash_reserve: f64,
    #[serde(default)]
    pub long_threshold: f64,
    #[serde(default)]
    pub short_threshold: f64,
    /// Issue an action every N steps (1 = every day).
    #[serde(default = "default_rebalance_every")]
    pub rebalance_every: usize,
    /// Weights applied at reset. Defaults to `weights`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_allocation: Option<Vec<f64>>,
}

fn default_rebalance_every() -> usize {
    1
}

impl StrategyConfig {
    pub fn action_params(&self) -> ActionParams {
        ActionParams::default()
            .with_cash_reserve(self.cash_reserve)
            .with_thresholds(self.long_threshold, self.short_threshold)
    }

    pub fn initial_weights(&self) -> &[f64] {
        self.initial_allocation.as_deref().unwrap_or(&self.weights)
    }
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Shape checks that don't need market data. Value checks on weights and
    /// cash are left to the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.data.symbols().len();
        if n == 0 {
            return Err(ConfigError::NoSymbols);
        }
        if self.strategy.weights.len() != n {
            return Err(ConfigError::WeightArity {
                field: "weights",
                expected: n,
                found: self.strategy.weights.len(),
            });
        }
        if let Some(init) = &self.strategy.initial_allocation {
            if init.len() != n {
                return Err(ConfigError::WeightArity {
                    field: "initial_allocation",
                    expected: n,
                    found: init.len(),
                });
            }
        }
        if self.strategy.rebalance_every == 0 {
            return Err(ConfigError::ZeroRebalance);
        }
        if let DataConfig::Synthetic { days, .. } = &self.data {
            if *days < 2 {
                return Err(ConfigError::TooFewSyntheticDays);
            }
        }
        Ok(())
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratiolab_core::engine::{SettlementPolicy, SolvencyCheck};

    const SAMPLE: &str = r#"
        [env]
        policy = "ratio_trade"
        cash = 50000.0
        fee = 0.002
        solvency = "enforce"

        [data]
        source = "synthetic"
        symbols = ["AAA", "BBB"]
        start = "2024-01-01"
        days = 60
        seed = 9

        [strategy]
        weights = [1.0, 3.0]
        cash_reserve = 0.5
        long_threshold = 100.0
        short_threshold = -100.0
        rebalance_every = 5
    "#;

    #[test]
    fn parses_full_config() {
        let config = RunConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.env.policy, SettlementPolicy::RatioTrade);
        assert_eq!(config.env.solvency, SolvencyCheck::Enforce);
        assert_eq!(config.env.cash, 50_000.0);
        assert_eq!(config.data.symbols(), &["AAA".to_string(), "BBB".to_string()]);
        assert!(matches!(config.data, DataConfig::Synthetic { days: 60, seed: 9, .. }));
        assert_eq!(config.strategy.rebalance_every, 5);
        assert_eq!(config.strategy.initial_weights(), &[1.0, 3.0]);

        let params = config.strategy.action_params();
        assert_eq!(params.cash_reserve, 0.5);
        assert_eq!(params.long_threshold, 100.0);
        assert_eq!(params.short_threshold, -100.0);
    }

    #[test]
    fn csv_source_and_defaults() {
        let toml = r#"
            [env]
            cash = 1000.0

            [data]
            source = "csv"
            dir = "data"
            symbols = ["SPY"]

            [strategy]
            weights = [1.0]
        "#;
        let config = RunConfig::from_toml(toml).unwrap();
        assert_eq!(config.env.fee, 0.0);
        assert_eq!(config.strategy.rebalance_every, 1);
        assert_eq!(config.strategy.cash_reserve, 0.0);
        assert!(matches!(config.data, DataConfig::Csv { ref dir, .. } if dir == Path::new("data")));
    }

    #[test]
    fn rejects_weight_arity() {
        let bad = SAMPLE.replace("weights = [1.0, 3.0]", "weights = [1.0]");
        let err = RunConfig::from_toml(&bad).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WeightArity {
                field: "weights",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_zero_rebalance() {
        let bad = SAMPLE.replace("rebalance_every = 5", "rebalance_every = 0");
        assert!(matches!(
            RunConfig::from_toml(&bad).unwrap_err(),
            ConfigError::ZeroRebalance
        ));
    }

    #[test]
    fn rejects_unknown_source() {
        let bad = SAMPLE.replace("source = \"synthetic\"", "source = \"yahoo\"");
        assert!(matches!(
            RunConfig::from_toml(&bad).unwrap_err(),
            ConfigError::Toml(_)
        ));
    }

    #[test]
    fn run_id_deterministic() {
        let a = RunConfig::from_toml(SAMPLE).unwrap();
        let b = RunConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = RunConfig::from_toml(SAMPLE).unwrap();
        let b = RunConfig::from_toml(&SAMPLE.replace("seed = 9", "seed = 10")).unwrap();
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
    }
}

//! Run driver — wires together config, market data, the environment, and
//! metrics.
//!
//! Two entry points:
//! - `run_from_config()`: loads data per `[data]`, then runs. Used by the CLI.
//! - `run()`: takes pre-loaded data. Used by tests and repeated runs over the
//!   same market.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use ratiolab_core::engine::{EngineError, StepLog, TradingEnv};

use crate::config::{RunConfig, RunId};
use crate::data_loader::{load_market_data, DataSource, LoadError, LoadedData};
use crate::metrics::RunSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("config symbols {config:?} do not match loaded symbols {loaded:?}")]
    SymbolMismatch {
        config: Vec<String>,
        loaded: Vec<String>,
    },
    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,
    pub symbols: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub dataset_hash: String,
    pub source: DataSource,
    pub summary: RunSummary,
    pub log: StepLog,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunReport {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load data for `config` and run it.
pub fn run_from_config(config: &RunConfig) -> Result<RunReport, RunError> {
    let loaded = load_market_data(&config.data)?;
    run(config, &loaded)
}

/// Run the constant-weight schedule over pre-loaded data.
///
/// Resets with the initial allocation, then steps until `done`, issuing an
/// action with the target weights every `rebalance_every` steps.
pub fn run(config: &RunConfig, loaded: &LoadedData) -> Result<RunReport, RunError> {
    let market = &loaded.market;
    if market.symbols() != config.data.symbols() {
        return Err(RunError::SymbolMismatch {
            config: config.data.symbols().to_vec(),
            loaded: market.symbols().to_vec(),
        });
    }

    let run_id = config.run_id()?;
    info!(
        run_id = %&run_id[..12],
        symbols = market.symbols().len(),
        days = market.length(),
        "run started"
    );

    let strategy = &config.strategy;
    let params = strategy.action_params();
    let mut env = TradingEnv::new(config.env.clone(), market)?;
    env.reset(Some(strategy.initial_weights()))?;

    let mut steps = 0usize;
    loop {
        let done = env.step()?.done;
        steps += 1;
        if done {
            break;
        }
        if steps % strategy.rebalance_every == 0 {
            debug!(day = env.day(), "rebalancing");
            env.action(&strategy.weights, &params)?;
        }
    }

    let summary = RunSummary::compute(env.log(), env.initial_cash());
    info!(
        steps,
        final_equity = summary.final_equity,
        total_return_pct = summary.total_return_pct,
        "run finished"
    );

    let dates = market.dates();
    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        symbols: market.symbols().to_vec(),
        start_date: dates.first().map(|d| d.to_string()).unwrap_or_default(),
        end_date: dates.last().map(|d| d.to_string()).unwrap_or_default(),
        dataset_hash: loaded.dataset_hash.clone(),
        source: loaded.source,
        summary,
        log: env.log().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataConfig, StrategyConfig};
    use chrono::NaiveDate;
    use ratiolab_core::engine::EnvConfig;

    fn config(weights: Vec<f64>, rebalance_every: usize) -> RunConfig {
        let symbols = (0..weights.len()).map(|i| format!("S{i}")).collect();
        RunConfig {
            env: EnvConfig::new(10_000.0, 0.001),
            data: DataConfig::Synthetic {
                symbols,
                start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                days: 30,
                seed: 5,
            },
            strategy: StrategyConfig {
                weights,
                cash_reserve: 0.0,
                long_threshold: 0.0,
                short_threshold: 0.0,
                rebalance_every,
                initial_allocation: None,
            },
        }
    }

    #[test]
    fn runs_every_step() {
        let report = run_from_config(&config(vec![1.0, 1.0], 1)).unwrap();
        assert_eq!(report.log.len(), 29);
        assert_eq!(report.summary.steps, 29);
        assert!(report.is_synthetic());
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.symbols, vec!["S0", "S1"]);
    }

    #[test]
    fn rebalance_interval_limits_trading() {
        let daily = run_from_config(&config(vec![1.0, 1.0], 1)).unwrap();
        let weekly = run_from_config(&config(vec![1.0, 1.0], 5)).unwrap();
        let total = |r: &RunReport| r.summary.buy_fills + r.summary.sell_fills;
        assert!(total(&weekly) < total(&daily));
    }

    #[test]
    fn zero_weights_stay_in_cash() {
        let report = run_from_config(&config(vec![0.0, 0.0], 1)).unwrap();
        assert_eq!(report.summary.final_equity, 10_000.0);
        assert_eq!(report.summary.buy_fills, 0);
        assert_eq!(report.summary.total_fees, 0.0);
    }

    #[test]
    fn symbol_mismatch_is_rejected() {
        let cfg = config(vec![1.0], 1);
        let mut other = config(vec![1.0, 1.0], 1);
        other.data = DataConfig::Synthetic {
            symbols: vec!["ZZZ".into()],
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            days: 10,
            seed: 1,
        };
        let loaded = load_market_data(&other.data).unwrap();
        assert!(matches!(
            run(&cfg, &loaded),
            Err(RunError::SymbolMismatch { .. })
        ));
    }
}

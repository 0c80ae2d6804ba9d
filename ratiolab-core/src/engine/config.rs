//! Environment construction config.

use super::error::EngineError;
use super::settlement::SettlementPolicy;
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) for the flat fee rate.
pub const MAX_FEE: f64 = 0.1;

/// What happens when a step would push cash below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolvencyCheck {
    /// Negative cash is allowed and logged (unconstrained margin).
    #[default]
    Off,
    /// The step is rejected with `EngineError::Insolvent`.
    Enforce,
}

/// Configuration for a `TradingEnv`.
///
/// Deserializes from the `[env]` table of a run config:
///
/// ```toml
/// policy = "ratio_trade"
/// cash = 100000.0
/// fee = 0.001
/// adj_close = [true, false]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    #[serde(default)]
    pub policy: SettlementPolicy,
    pub cash: f64,
    #[serde(default)]
    pub fee: f64,
    /// Stored on the environment, not applied by ratio settlement.
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Per-symbol choice of adjusted close over close. `None` means all false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<Vec<bool>>,
    #[serde(default)]
    pub solvency: SolvencyCheck,
}

fn default_leverage() -> f64 {
    1.0
}

impl EnvConfig {
    pub fn new(cash: f64, fee: f64) -> Self {
        Self {
            policy: SettlementPolicy::RatioTrade,
            cash,
            fee,
            leverage: default_leverage(),
            adj_close: None,
            solvency: SolvencyCheck::Off,
        }
    }

    pub fn with_adj_close(mut self, flags: Vec<bool>) -> Self {
        self.adj_close = Some(flags);
        self
    }

    pub fn with_solvency(mut self, solvency: SolvencyCheck) -> Self {
        self.solvency = solvency;
        self
    }

    pub fn with_leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    /// Check the scalar preconditions. Symbol-dependent checks happen in
    /// `TradingEnv::new`.
    pub fn validate(&self) -> Result<(), EngineError> {
        // `!(x > 0)` also rejects NaN
        if !(self.cash > 0.0) || !self.cash.is_finite() {
            return Err(EngineError::NonPositiveCash(self.cash));
        }
        if !(0.0..MAX_FEE).contains(&self.fee) {
            return Err(EngineError::FeeOutOfRange(self.fee));
        }
        Ok(())
    }

    /// Adjusted-close flags resolved against the number of symbols.
    pub fn adj_close_flags(&self, n_symbols: usize) -> Result<Vec<bool>, EngineError> {
        match &self.adj_close {
            None => Ok(vec![false; n_symbols]),
            Some(flags) if flags.len() == n_symbols => Ok(flags.clone()),
            Some(flags) => Err(EngineError::AdjCloseMismatch {
                expected: n_symbols,
                found: flags.len(),
            }),
        }
    }
}

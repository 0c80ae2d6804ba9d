//! Allocator — target portfolio weights to per-instrument order intents.
//!
//! Weights and the cash reserve fraction are normalized by their sum and read
//! as proportions of current cash. Each instrument's target amount is compared
//! with its current position; deltas outside the neutral zone become orders.

use crate::domain::{InstrumentLedger, Order};
use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};

/// Knobs for one allocation action. `Default` is all zero: no reserve and a
/// neutral zone of width zero, so every nonzero delta trades.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionParams {
    /// Weight of cash kept out of the market, on the same scale as the
    /// instrument weights.
    #[serde(default)]
    pub cash_reserve: f64,
    /// Deltas above this become long orders.
    #[serde(default)]
    pub long_threshold: f64,
    /// Deltas below this become short orders.
    #[serde(default)]
    pub short_threshold: f64,
}

impl ActionParams {
    pub fn with_cash_reserve(mut self, cash_reserve: f64) -> Self {
        self.cash_reserve = cash_reserve;
        self
    }

    pub fn with_thresholds(mut self, long_threshold: f64, short_threshold: f64) -> Self {
        self.long_threshold = long_threshold;
        self.short_threshold = short_threshold;
        self
    }
}

/// Compute the order each instrument should carry for the given weights.
///
/// `None` means the delta fell inside `[short_threshold, long_threshold]`.
/// Pure: nothing is mutated.
pub fn allocate(
    cash: f64,
    ledgers: &[InstrumentLedger],
    weights: &[f64],
    params: &ActionParams,
) -> Result<Vec<Option<Order>>, EngineError> {
    if weights.len() != ledgers.len() {
        return Err(EngineError::WeightArity {
            expected: ledgers.len(),
            found: weights.len(),
        });
    }
    for (ledger, &weight) in ledgers.iter().zip(weights) {
        if !(weight >= 0.0) || !weight.is_finite() {
            return Err(EngineError::NegativeWeight {
                symbol: ledger.symbol().to_string(),
                weight,
            });
        }
    }
    if !(params.cash_reserve >= 0.0) || !params.cash_reserve.is_finite() {
        return Err(EngineError::InvalidCashReserve(params.cash_reserve));
    }

    let weight_sum: f64 = weights.iter().sum();
    // All-zero weights: everything goes to the reserve
    let cash_reserve = if weight_sum == 0.0 {
        1.0
    } else {
        params.cash_reserve
    };
    let denom = weight_sum + cash_reserve;

    let orders = ledgers
        .iter()
        .zip(weights)
        .map(|(ledger, &weight)| {
            let target = cash * weight / denom;
            let delta = target - ledger.position();
            if delta > params.long_threshold {
                Some(Order::long(delta))
            } else if delta < params.short_threshold {
                Some(Order::short(-delta))
            } else {
                None
            }
        })
        .collect();

    Ok(orders)
}

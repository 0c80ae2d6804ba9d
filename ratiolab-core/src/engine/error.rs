//! Engine precondition and contract errors.

use thiserror::Error;

/// Errors raised by environment construction, allocation, and stepping.
///
/// All of them are caller mistakes; nothing in the engine is mutated when one
/// is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("cash should be > 0, is {0}")]
    NonPositiveCash(f64),

    #[error("fee should be in [0, 0.1), is {0}")]
    FeeOutOfRange(f64),

    #[error("adj_close flags: expected {expected}, got {found}")]
    AdjCloseMismatch { expected: usize, found: usize },

    #[error("environment needs at least one symbol")]
    EmptyUniverse,

    #[error("no price series for symbol '{0}'")]
    MissingSeries(String),

    #[error("weights: expected {expected} entries, got {found}")]
    WeightArity { expected: usize, found: usize },

    #[error("weight for '{symbol}' must be a non-negative number, is {weight}")]
    NegativeWeight { symbol: String, weight: f64 },

    #[error("cash reserve fraction must be a non-negative number, is {0}")]
    InvalidCashReserve(f64),

    #[error("unknown settlement policy '{0}' (available: ratio_trade)")]
    UnknownPolicy(String),

    #[error("day {day} has no next day in data of length {length}")]
    DayOutOfRange { day: usize, length: usize },

    #[error("step would leave cash at {cash}, solvency check is enforced")]
    Insolvent { cash: f64 },
}

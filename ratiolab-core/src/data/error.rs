//! Structured error types for data loading and validation.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: {reason}")]
    Parse { row: usize, reason: String },

    #[error("series '{symbol}' has no bars")]
    EmptySeries { symbol: String },

    #[error("series '{symbol}': date {date} at index {index} is not after the previous date")]
    NonMonotonicDates {
        symbol: String,
        index: usize,
        date: NaiveDate,
    },

    #[error("series '{symbol}': non-positive or non-finite close at index {index}")]
    InvalidPrice { symbol: String, index: usize },

    #[error("series '{symbol}' has {found} bars, expected {expected}")]
    LengthMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },

    #[error("series '{symbol}' is not on the common calendar at index {index}")]
    DateMismatch { symbol: String, index: usize },

    #[error("duplicate symbol '{0}'")]
    DuplicateSymbol(String),

    #[error("no dates shared by every symbol")]
    NoOverlap,

    #[error("market data needs at least one symbol")]
    EmptyUniverse,
}

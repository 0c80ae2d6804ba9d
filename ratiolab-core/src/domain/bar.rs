//! Bar — one day of OHLCV data for a single symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar.
///
/// `adj_close` is kept alongside `close`; each instrument ledger decides which
/// of the two drives its price ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.adj_close.is_nan()
    }

    /// Basic sanity check: high >= low, high/low bracket open and close,
    /// and the two closing prices are positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
            && self.adj_close > 0.0
    }

    /// Closing price, adjusted or raw.
    pub fn close_price(&self, adjusted: bool) -> f64 {
        if adjusted {
            self.adj_close
        } else {
            self.close
        }
    }
}

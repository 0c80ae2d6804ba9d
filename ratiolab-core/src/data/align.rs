//! Multi-symbol time alignment.
//!
//! The engine steps every instrument on one calendar, so alignment keeps only
//! the dates that every symbol has a bar for. Nothing is forward-filled.

use super::error::DataError;
use super::series::{MarketData, PriceSeries};
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Align symbols onto the dates they all share and bundle them.
///
/// Input order is preserved as the symbol order of the returned `MarketData`.
pub fn align_symbols(symbol_bars: Vec<(String, Vec<Bar>)>) -> Result<MarketData, DataError> {
    if symbol_bars.is_empty() {
        return Err(DataError::EmptyUniverse);
    }

    let mut seen = HashSet::new();
    for (symbol, _) in &symbol_bars {
        if !seen.insert(symbol.as_str()) {
            return Err(DataError::DuplicateSymbol(symbol.clone()));
        }
    }

    // Count how many symbols carry each date
    let mut coverage: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (_, bars) in &symbol_bars {
        let unique: HashSet<NaiveDate> = bars.iter().map(|b| b.date).collect();
        for date in unique {
            *coverage.entry(date).or_default() += 1;
        }
    }

    let n_symbols = symbol_bars.len();
    let common: HashSet<NaiveDate> = coverage
        .into_iter()
        .filter(|&(_, count)| count == n_symbols)
        .map(|(date, _)| date)
        .collect();

    if common.is_empty() {
        return Err(DataError::NoOverlap);
    }

    let mut series = Vec::with_capacity(n_symbols);
    for (symbol, mut bars) in symbol_bars {
        let before = bars.len();
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        bars.retain(|b| common.contains(&b.date));
        if bars.len() != before {
            debug!(
                symbol = %symbol,
                dropped = before - bars.len(),
                "dropped bars outside the common calendar"
            );
        }
        series.push(PriceSeries::new(symbol, bars)?);
    }

    MarketData::new(series)
}

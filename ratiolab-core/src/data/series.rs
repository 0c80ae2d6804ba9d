//! Per-symbol price series and the aligned multi-symbol bundle the engine reads.

use super::error::DataError;
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Validated daily bars for one symbol, indexed by day.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input, non-increasing dates and
    /// non-positive closing prices.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(DataError::EmptySeries { symbol });
        }

        for (index, bar) in bars.iter().enumerate() {
            let closes_ok = bar.close.is_finite()
                && bar.close > 0.0
                && bar.adj_close.is_finite()
                && bar.adj_close > 0.0;
            if !closes_ok {
                return Err(DataError::InvalidPrice { symbol, index });
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(DataError::NonMonotonicDates {
                    symbol,
                    index,
                    date: bar.date,
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar(&self, day: usize) -> Option<&Bar> {
        self.bars.get(day)
    }

    pub fn close(&self, day: usize, adjusted: bool) -> Option<f64> {
        self.bar(day).map(|b| b.close_price(adjusted))
    }

    pub fn open(&self, day: usize) -> Option<f64> {
        self.bar(day).map(|b| b.open)
    }

    pub fn volume(&self, day: usize) -> Option<u64> {
        self.bar(day).map(|b| b.volume)
    }

    pub fn date(&self, day: usize) -> Option<NaiveDate> {
        self.bar(day).map(|b| b.date)
    }
}

/// Price series for several symbols on one shared calendar.
///
/// Symbol order is the order the series were supplied in. The engine records
/// per-symbol log vectors in this order.
#[derive(Debug, Clone)]
pub struct MarketData {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    series: HashMap<String, Arc<PriceSeries>>,
}

impl MarketData {
    /// Bundle already-aligned series. Every series must cover exactly the
    /// same dates as the first one.
    pub fn new(series: Vec<PriceSeries>) -> Result<Self, DataError> {
        let first = series.first().ok_or(DataError::EmptyUniverse)?;
        let dates: Vec<NaiveDate> = first.bars().iter().map(|b| b.date).collect();

        let mut symbols = Vec::with_capacity(series.len());
        let mut by_symbol = HashMap::with_capacity(series.len());

        for s in series {
            if s.len() != dates.len() {
                return Err(DataError::LengthMismatch {
                    symbol: s.symbol().to_string(),
                    expected: dates.len(),
                    found: s.len(),
                });
            }
            if let Some(index) = s
                .bars()
                .iter()
                .zip(&dates)
                .position(|(bar, date)| bar.date != *date)
            {
                return Err(DataError::DateMismatch {
                    symbol: s.symbol().to_string(),
                    index,
                });
            }

            let symbol = s.symbol().to_string();
            if by_symbol.contains_key(&symbol) {
                return Err(DataError::DuplicateSymbol(symbol));
            }
            symbols.push(symbol.clone());
            by_symbol.insert(symbol, Arc::new(s));
        }

        Ok(Self {
            dates,
            symbols,
            series: by_symbol,
        })
    }

    /// Number of days on the common calendar.
    pub fn length(&self) -> usize {
        self.dates.len()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn series(&self, symbol: &str) -> Option<&Arc<PriceSeries>> {
        self.series.get(symbol)
    }
}

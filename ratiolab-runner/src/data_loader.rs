//! Price loading for the runner.
//!
//! Resolves a `DataConfig` into aligned `MarketData`:
//! 1. `csv` → read `{dir}/{symbol}.csv` for every symbol
//! 2. `synthetic` → generate a seeded random walk per symbol
//!
//! Either way the symbols are then aligned onto their shared dates. Synthetic
//! results are tagged so they can't be mistaken for real backtests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use ratiolab_core::data::{align_symbols, load_csv, synthetic_bars, DataError, MarketData};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no CSV for '{symbol}' at {}", path.display())]
    MissingFile { symbol: String, path: PathBuf },

    #[error("failed to load '{symbol}': {source}")]
    Symbol {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Provenance of the loaded prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Aligned market data plus provenance.
#[derive(Debug)]
pub struct LoadedData {
    pub market: MarketData,
    pub source: DataSource,
    /// BLAKE3 over every aligned bar, for fingerprinting.
    pub dataset_hash: String,
}

impl LoadedData {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load and align the symbols named by `config`.
pub fn load_market_data(config: &DataConfig) -> Result<LoadedData, LoadError> {
    let (symbol_bars, source) = match config {
        DataConfig::Csv { dir, symbols } => {
            let mut out = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let path = dir.join(format!("{symbol}.csv"));
                if !path.is_file() {
                    return Err(LoadError::MissingFile {
                        symbol: symbol.clone(),
                        path,
                    });
                }
                let bars = load_csv(&path).map_err(|source| LoadError::Symbol {
                    symbol: symbol.clone(),
                    source,
                })?;
                out.push((symbol.clone(), bars));
            }
            (out, DataSource::Csv)
        }
        DataConfig::Synthetic {
            symbols,
            start,
            days,
            seed,
        } => {
            warn!(
                symbols = symbols.len(),
                "generating synthetic data, results will be tagged as synthetic"
            );
            let out = symbols
                .iter()
                .map(|s| (s.clone(), synthetic_bars(s, *start, *days, *seed)))
                .collect();
            (out, DataSource::Synthetic)
        }
    };

    let market = align_symbols(symbol_bars)?;
    let dataset_hash = compute_dataset_hash(&market);
    info!(
        symbols = market.symbols().len(),
        days = market.length(),
        source = ?source,
        "market data loaded"
    );

    Ok(LoadedData {
        market,
        source,
        dataset_hash,
    })
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// Covers every symbol in configuration order, so reordering symbols
/// changes the hash just as it changes the log layout.
pub fn compute_dataset_hash(market: &MarketData) -> String {
    let mut hasher = blake3::Hasher::new();

    for symbol in market.symbols() {
        hasher.update(symbol.as_bytes());
        if let Some(series) = market.series(symbol) {
            for bar in series.bars() {
                hasher.update(bar.date.to_string().as_bytes());
                hasher.update(&bar.open.to_le_bytes());
                hasher.update(&bar.high.to_le_bytes());
                hasher.update(&bar.low.to_le_bytes());
                hasher.update(&bar.close.to_le_bytes());
                hasher.update(&bar.adj_close.to_le_bytes());
                hasher.update(&bar.volume.to_le_bytes());
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

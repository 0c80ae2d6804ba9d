//! Market data: validated price series, CSV ingestion, calendar alignment,
//! and synthetic generation.

pub mod align;
pub mod error;
pub mod ingest;
pub mod series;
pub mod synthetic;

pub use align::align_symbols;
pub use error::DataError;
pub use ingest::{load_csv, read_csv, write_csv};
pub use series::{MarketData, PriceSeries};
pub use synthetic::synthetic_bars;

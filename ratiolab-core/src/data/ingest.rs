//! CSV ingestion of daily OHLCV bars.
//!
//! Expected header: `date,open,high,low,close,adj_close,volume`. The Yahoo
//! export spellings (`Date`, `Adj Close`, ...) are accepted too. When the
//! adjusted close column is missing, `close` is used for both.

use super::error::DataError;
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Adj Close", alias = "adj close", alias = "Adj_Close")]
    adj_close: Option<f64>,
    #[serde(alias = "Volume")]
    volume: f64,
}

/// Load bars from a CSV file on disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    let reader = csv::Reader::from_path(path.as_ref())?;
    read_rows(reader)
}

/// Load bars from any CSV reader (used by tests and in-memory sources).
pub fn read_csv<R: Read>(input: R) -> Result<Vec<Bar>, DataError> {
    read_rows(csv::Reader::from_reader(input))
}

fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Bar>, DataError> {
    let mut bars = Vec::new();

    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_num = idx + 1;
        let row = result?;
        let date = parse_date(&row.date).ok_or_else(|| DataError::Parse {
            row: row_num,
            reason: format!("unparseable date '{}'", row.date),
        })?;
        // `!(x >= 0)` also rejects NaN
        if !(row.volume >= 0.0) {
            return Err(DataError::Parse {
                row: row_num,
                reason: format!("invalid volume {}", row.volume),
            });
        }

        let bar = Bar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.adj_close.unwrap_or(row.close),
            volume: row.volume.round() as u64,
        };
        if !bar.is_sane() {
            return Err(DataError::Parse {
                row: row_num,
                reason: format!(
                    "inconsistent OHLC (open {}, high {}, low {}, close {}, adj close {})",
                    bar.open, bar.high, bar.low, bar.close, bar.adj_close
                ),
            });
        }
        bars.push(bar);
    }

    Ok(bars)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    // Accept both plain dates and "YYYY-MM-DD HH:MM:SS" timestamps
    let day = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Write bars in the canonical column layout.
pub fn write_csv(path: impl AsRef<Path>, bars: &[Bar]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.write_record(["date", "open", "high", "low", "close", "adj_close", "volume"])?;
    for b in bars {
        wtr.write_record([
            b.date.to_string(),
            format!("{:.6}", b.open),
            format!("{:.6}", b.high),
            format!("{:.6}", b.low),
            format!("{:.6}", b.close),
            format!("{:.6}", b.adj_close),
            b.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

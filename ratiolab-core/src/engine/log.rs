//! Per-step history of the environment.

use crate::domain::FillSide;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Append-only step history. Row `t` describes the transition out of day `t`;
/// inner vectors are in ledger order.
///
/// Float columns serialize non-finite values as `null` and read `null` back
/// as NaN. A flat instrument in a fully invested book has a `0 / 0` return
/// ratio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    /// Date of the first ledger before the step.
    pub dates: Vec<NaiveDate>,
    /// `next_position - position` per ledger.
    #[serde(with = "nullable_rows")]
    pub position_diffs: Vec<Vec<f64>>,
    /// `(cash - entry_cash + next_position) / (cash + position)` per ledger.
    #[serde(with = "nullable_rows")]
    pub return_ratios: Vec<Vec<f64>>,
    /// Equity after the step.
    #[serde(with = "nullable")]
    pub equity: Vec<f64>,
    /// Cash spent per ledger (negative on sells).
    #[serde(with = "nullable_rows")]
    pub entry_cash: Vec<Vec<f64>>,
    /// Filled order size per ledger, 0 when idle.
    #[serde(with = "nullable_rows")]
    pub entries: Vec<Vec<f64>>,
    pub fills: Vec<Vec<FillSide>>,
    /// Cash after the step.
    #[serde(with = "nullable")]
    pub cash: Vec<f64>,
}

fn to_nullable(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], s: S) -> Result<S::Ok, S::Error> {
        let out: Vec<Option<f64>> = values.iter().map(|&x| super::to_nullable(x)).collect();
        out.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(d)?;
        Ok(raw.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
    }
}

mod nullable_rows {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rows: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
        let out: Vec<Vec<Option<f64>>> = rows
            .iter()
            .map(|row| row.iter().map(|&x| super::to_nullable(x)).collect())
            .collect();
        out.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let raw = Vec::<Vec<Option<f64>>>::deserialize(d)?;
        Ok(raw
            .into_iter()
            .map(|row| row.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

/// One step's worth of log columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub date: NaiveDate,
    pub position_diffs: Vec<f64>,
    pub return_ratios: Vec<f64>,
    pub equity: f64,
    pub entry_cash: Vec<f64>,
    pub entries: Vec<f64>,
    pub fills: Vec<FillSide>,
    pub cash: f64,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn push(&mut self, record: StepRecord) {
        self.dates.push(record.date);
        self.position_diffs.push(record.position_diffs);
        self.return_ratios.push(record.return_ratios);
        self.equity.push(record.equity);
        self.entry_cash.push(record.entry_cash);
        self.entries.push(record.entries);
        self.fills.push(record.fills);
        self.cash.push(record.cash);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.equity.last().copied()
    }

    /// Reassemble step `t`, or `None` when any column is shorter than `t + 1`
    /// or the per-ledger rows disagree in width.
    pub fn record(&self, t: usize) -> Option<StepRecord> {
        let record = StepRecord {
            date: *self.dates.get(t)?,
            position_diffs: self.position_diffs.get(t)?.clone(),
            return_ratios: self.return_ratios.get(t)?.clone(),
            equity: *self.equity.get(t)?,
            entry_cash: self.entry_cash.get(t)?.clone(),
            entries: self.entries.get(t)?.clone(),
            fills: self.fills.get(t)?.clone(),
            cash: *self.cash.get(t)?,
        };
        let n = record.fills.len();
        let widths = [
            record.position_diffs.len(),
            record.return_ratios.len(),
            record.entry_cash.len(),
            record.entries.len(),
        ];
        widths.iter().all(|&w| w == n).then_some(record)
    }

    /// Count of ledgers with the given fill on step `t`.
    pub fn fill_count(&self, t: usize, side: FillSide) -> usize {
        self.fills
            .get(t)
            .map(|row| row.iter().filter(|&&f| f == side).count())
            .unwrap_or(0)
    }
}

impl fmt::Display for StepLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "==================================================";
        writeln!(f, "{RULE}")?;
        match self.len().checked_sub(1) {
            None => writeln!(f, "No steps recorded")?,
            Some(t) => match self.record(t) {
                None => writeln!(f, "Step {} is incomplete", t + 1)?,
                Some(r) => {
                    let entry_cash: f64 = r.entry_cash.iter().sum();
                    writeln!(f, "Period             : {}", self.len())?;
                    writeln!(f, "Date               : {}", r.date)?;
                    writeln!(f, "Equity             : {:.2}", r.equity)?;
                    writeln!(f, "Entry cash         : {:.2}", entry_cash)?;
                    writeln!(f, "Cash               : {:.2}", r.cash)?;
                    writeln!(f, "Number of buyers   : {}", self.fill_count(t, FillSide::Buy))?;
                    writeln!(f, "Number of sellers  : {}", self.fill_count(t, FillSide::Sell))?;
                }
            },
        }
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(equity: f64, fills: Vec<FillSide>) -> StepRecord {
        let n = fills.len();
        StepRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            position_diffs: vec![0.0; n],
            return_ratios: vec![1.0; n],
            equity,
            entry_cash: vec![10.0; n],
            entries: vec![10.0; n],
            fills,
            cash: 5.0,
        }
    }

    #[test]
    fn push_appends_every_column() {
        let mut log = StepLog::new();
        log.push(record(100.0, vec![FillSide::Buy, FillSide::Hold]));
        log.push(record(101.0, vec![FillSide::Sell, FillSide::Hold]));
        assert_eq!(log.len(), 2);
        assert_eq!(log.fills.len(), 2);
        assert_eq!(log.cash.len(), 2);
        assert_eq!(log.final_equity(), Some(101.0));
    }

    #[test]
    fn reset_empties() {
        let mut log = StepLog::new();
        log.push(record(100.0, vec![FillSide::Buy]));
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log.final_equity(), None);
    }

    #[test]
    fn display_summarizes_last_step() {
        let mut log = StepLog::new();
        log.push(record(100.0, vec![FillSide::Buy, FillSide::Buy, FillSide::Sell]));
        let text = log.to_string();
        assert!(text.contains("Period             : 1"));
        assert!(text.contains("Date               : 2024-03-01"));
        assert!(text.contains("Equity             : 100.00"));
        assert!(text.contains("Entry cash         : 30.00"));
        assert!(text.contains("Number of buyers   : 2"));
        assert!(text.contains("Number of sellers  : 1"));
        assert!(text.starts_with("====="));
    }

    #[test]
    fn display_empty_log() {
        assert!(StepLog::new().to_string().contains("No steps recorded"));
    }

    #[test]
    fn uneven_columns_do_not_panic() {
        let mut log = StepLog::new();
        log.push(record(100.0, vec![FillSide::Buy, FillSide::Hold]));
        log.cash.pop();
        assert!(log.record(0).is_none());
        assert!(log.to_string().contains("Step 1 is incomplete"));

        let mut log = StepLog::new();
        log.push(record(100.0, vec![FillSide::Buy, FillSide::Hold]));
        log.entries[0].pop();
        assert!(log.record(0).is_none());
        assert!(log.record(1).is_none());
    }

    #[test]
    fn record_reassembles_pushed_step() {
        let mut log = StepLog::new();
        let pushed = record(100.0, vec![FillSide::Sell]);
        log.push(pushed.clone());
        assert_eq!(log.record(0), Some(pushed));
    }

    // ── Serialization ──

    #[test]
    fn non_finite_values_round_trip_through_null() {
        let mut log = StepLog::new();
        let mut r = record(100.0, vec![FillSide::Buy, FillSide::Hold]);
        r.return_ratios = vec![1.05, f64::NAN];
        log.push(r);

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("[1.05,null]"));

        let restored: StepLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.return_ratios[0][0], 1.05);
        assert!(restored.return_ratios[0][1].is_nan());
        assert_eq!(restored.equity, log.equity);
        assert_eq!(restored.fills, log.fills);
    }
}

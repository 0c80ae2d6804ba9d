//! Run metrics — pure functions over the step log.
//!
//! Equity-curve metrics take the curve with the starting cash prepended, so a
//! run of `n` steps yields `n + 1` equity points.

use serde::{Deserialize, Serialize};

use ratiolab_core::domain::FillSide;
use ratiolab_core::engine::StepLog;

/// Trading days per year for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Aggregate statistics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub final_cash: f64,
    /// Percent, e.g. 12.5 for +12.5%.
    pub total_return_pct: f64,
    pub cagr_pct: f64,
    pub sharpe: f64,
    /// Percent, non-positive.
    pub max_drawdown_pct: f64,
    pub steps: usize,
    pub total_fees: f64,
    /// Σ |entry| / initial cash.
    pub turnover: f64,
    pub buy_fills: usize,
    pub sell_fills: usize,
    /// Steps that ended with negative cash.
    pub negative_cash_steps: usize,
}

impl RunSummary {
    pub fn compute(log: &StepLog, initial_cash: f64) -> Self {
        let curve = equity_curve(log, initial_cash);
        let final_equity = curve.last().copied().unwrap_or(initial_cash);
        let count = |side: FillSide| log.fills.iter().flatten().filter(|&&f| f == side).count();

        Self {
            initial_cash,
            final_equity,
            final_cash: log.cash.last().copied().unwrap_or(initial_cash),
            total_return_pct: total_return(&curve) * 100.0,
            cagr_pct: cagr(&curve) * 100.0,
            sharpe: sharpe_ratio(&curve),
            max_drawdown_pct: max_drawdown(&curve) * 100.0,
            steps: log.len(),
            total_fees: total_fees(log),
            turnover: if initial_cash > 0.0 {
                log.entries.iter().flatten().map(|e| e.abs()).sum::<f64>() / initial_cash
            } else {
                0.0
            },
            buy_fills: count(FillSide::Buy),
            sell_fills: count(FillSide::Sell),
            negative_cash_steps: log.cash.iter().filter(|&&c| c < 0.0).count(),
        }
    }
}

/// Starting cash followed by post-step equity.
pub fn equity_curve(log: &StepLog, initial_cash: f64) -> Vec<f64> {
    std::iter::once(initial_cash)
        .chain(log.equity.iter().copied())
        .collect()
}

/// Fees paid across the run.
///
/// A buy of `s` costs `s·(1+f)` and a sell returns `s·(1−f)`, so the fee is
/// whatever entry cash exceeds the signed order size.
pub fn total_fees(log: &StepLog) -> f64 {
    let mut fees = 0.0;
    for ((fills, entries), cash) in log.fills.iter().zip(&log.entries).zip(&log.entry_cash) {
        for ((fill, entry), entry_cash) in fills.iter().zip(entries).zip(cash) {
            fees += match fill {
                FillSide::Buy => entry_cash - entry,
                FillSide::Sell => entry_cash + entry,
                FillSide::Hold => 0.0,
            };
        }
    }
    fees
}

/// (final − initial) / initial.
pub fn total_return(curve: &[f64]) -> f64 {
    match (curve.first(), curve.last()) {
        (Some(&first), Some(&last)) if curve.len() >= 2 && first > 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

/// Compound annual growth over `curve.len() - 1` trading days.
pub fn cagr(curve: &[f64]) -> f64 {
    let (Some(&first), Some(&last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };
    if curve.len() < 2 || first <= 0.0 || last <= 0.0 {
        return 0.0;
    }
    let years = (curve.len() - 1) as f64 / TRADING_DAYS;
    (last / first).powf(1.0 / years) - 1.0
}

/// Annualized Sharpe of daily returns, zero risk-free rate.
///
/// Zero when there are fewer than two returns or no variance.
pub fn sharpe_ratio(curve: &[f64]) -> f64 {
    let returns = daily_returns(curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    mean / std * TRADING_DAYS.sqrt()
}

/// Deepest peak-to-trough fall as a negative fraction (−0.15 = 15%).
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &eq in curve {
        peak = peak.max(eq);
        if peak > 0.0 {
            worst = worst.min((eq - peak) / peak);
        }
    }
    worst
}

pub fn daily_returns(curve: &[f64]) -> Vec<f64> {
    curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: the full `RunReport` with schema versioning
//! - **CSV**: equity curve and the per-symbol fill tape
//! - **Markdown**: a human-readable single-run report
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ratiolab_core::engine::StepLog;

use crate::runner::{RunReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunReport` to pretty JSON.
pub fn export_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize RunReport to JSON")
}

/// Deserialize a `RunReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunReport> {
    let report: RunReport =
        serde_json::from_str(json).context("failed to deserialize RunReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the post-step equity curve as CSV.
///
/// Columns: date, equity, cash. `date` is the day each step settled from.
pub fn export_equity_csv(log: &StepLog) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "cash"])?;
    for ((date, equity), cash) in log.dates.iter().zip(&log.equity).zip(&log.cash) {
        wtr.write_record([
            date.to_string(),
            format!("{:.2}", equity),
            format!("{:.2}", cash),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export one row per step and symbol. Fails when a log row is incomplete
/// or its width differs from `symbols`.
///
/// Columns: date, symbol, fill, fill_code, entry, entry_cash,
/// position_diff, return_ratio
pub fn export_fills_csv(log: &StepLog, symbols: &[String]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "symbol",
        "fill",
        "fill_code",
        "entry",
        "entry_cash",
        "position_diff",
        "return_ratio",
    ])?;

    for t in 0..log.len() {
        let Some(step) = log.record(t) else {
            bail!("step log row {t} is incomplete");
        };
        if step.fills.len() != symbols.len() {
            bail!(
                "step log row {t} has {} instruments, expected {}",
                step.fills.len(),
                symbols.len()
            );
        }
        for (i, symbol) in symbols.iter().enumerate() {
            let fill = step.fills[i];
            wtr.write_record([
                step.date.to_string(),
                symbol.clone(),
                fill.to_string(),
                fill.code().to_string(),
                format!("{:.6}", step.entries[i]),
                format!("{:.6}", step.entry_cash[i]),
                format!("{:.6}", step.position_diffs[i]),
                format!("{:.8}", step.return_ratios[i]),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a run into `output_dir`:
/// - `report.json` — the full `RunReport`
/// - `equity.csv` — per-step equity and cash
/// - `fills.csv` — per-step, per-symbol fill tape
/// - `report.md` — Markdown summary
///
/// Returns the directory written to.
pub fn save_artifacts(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let write = |name: &str, content: &str| -> Result<()> {
        let path = output_dir.join(name);
        std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    };

    write("report.json", &export_json(report)?)?;
    write("equity.csv", &export_equity_csv(&report.log)?)?;
    write("fills.csv", &export_fills_csv(&report.log, &report.symbols)?)?;
    write("report.md", &generate_report(report))?;

    Ok(output_dir.to_path_buf())
}

/// Load a `RunReport` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<RunReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single run.
pub fn generate_report(report: &RunReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Run Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run | {} |\n", report.run_id));
    md.push_str(&format!("| Symbols | {} |\n", report.symbols.join(", ")));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.start_date, report.end_date
    ));
    md.push_str(&format!("| Policy | {} |\n", report.config.env.policy));
    md.push_str(&format!("| Fee | {} |\n", report.config.env.fee));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if report.is_synthetic() {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Strategy\n\n");
    md.push_str("| Symbol | Weight |\n");
    md.push_str("| --- | --- |\n");
    for (symbol, weight) in report.symbols.iter().zip(&report.config.strategy.weights) {
        md.push_str(&format!("| {symbol} | {weight} |\n"));
    }
    md.push_str(&format!(
        "\nRebalance every {} step(s), cash reserve {}, neutral zone [{}, {}].\n\n",
        report.config.strategy.rebalance_every,
        report.config.strategy.cash_reserve,
        report.config.strategy.short_threshold,
        report.config.strategy.long_threshold,
    ));

    let s = &report.summary;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Initial Cash | {:.2} |\n", s.initial_cash));
    md.push_str(&format!("| Final Equity | {:.2} |\n", s.final_equity));
    md.push_str(&format!("| Total Return | {:.2}% |\n", s.total_return_pct));
    md.push_str(&format!("| CAGR | {:.2}% |\n", s.cagr_pct));
    md.push_str(&format!("| Sharpe | {:.3} |\n", s.sharpe));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", s.max_drawdown_pct));
    md.push_str(&format!("| Steps | {} |\n", s.steps));
    md.push_str(&format!("| Fees Paid | {:.2} |\n", s.total_fees));
    md.push_str(&format!("| Turnover | {:.2}x |\n", s.turnover));
    md.push_str(&format!("| Buy Fills | {} |\n", s.buy_fills));
    md.push_str(&format!("| Sell Fills | {} |\n", s.sell_fills));
    if s.negative_cash_steps > 0 {
        md.push_str(&format!(
            "| Steps With Negative Cash | {} |\n",
            s.negative_cash_steps
        ));
    }
    md.push('\n');

    md.push_str("## Last Step\n\n```text\n");
    md.push_str(&report.log.to_string());
    md.push_str("\n```\n");

    md
}

//! RatioLab CLI — run and synth commands.
//!
//! Commands:
//! - `run` — execute a rebalancing run from a TOML config file
//! - `synth` — write deterministic synthetic price CSVs for offline runs

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ratiolab_core::data::{synthetic_bars, write_csv};
use ratiolab_runner::{run_from_config, save_artifacts, RunConfig, RunReport};

#[derive(Parser)]
#[command(
    name = "ratiolab",
    about = "RatioLab CLI — day-stepping multi-instrument portfolio settlement"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a run from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for report.json, equity.csv, fills.csv and report.md.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Generate synthetic daily bars, one `{symbol}.csv` per symbol.
    Synth {
        /// Symbols to generate (e.g., AAA BBB).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// First date (YYYY-MM-DD).
        #[arg(long, default_value = "2020-01-01")]
        start: String,

        /// Number of trading days.
        #[arg(long, default_value_t = 252)]
        days: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { config, output_dir } => run_cmd(&config, &output_dir),
        Commands::Synth {
            symbols,
            start,
            days,
            seed,
            out,
        } => synth_cmd(&symbols, &start, days, seed, &out),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run_cmd(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = RunConfig::from_file(config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let report = run_from_config(&config).context("run failed")?;

    print_summary(&report);

    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn synth_cmd(symbols: &[String], start: &str, days: usize, seed: u64, out: &Path) -> Result<()> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start '{start}', expected YYYY-MM-DD"))?;
    if days < 2 {
        bail!("--days must be at least 2, got {days}");
    }

    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    for symbol in symbols {
        let path = out.join(format!("{symbol}.csv"));
        let bars = synthetic_bars(symbol, start, days, seed);
        write_csv(&path, &bars).with_context(|| format!("failed to write {}", path.display()))?;
        info!(symbol = %symbol, bars = bars.len(), path = %path.display(), "wrote synthetic CSV");
    }
    println!("Wrote {} symbol(s) to {}", symbols.len(), out.display());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let s = &report.summary;
    println!();
    println!("=== Run Result ===");
    println!("Symbols:        {}", report.symbols.join(", "));
    println!(
        "Period:         {} to {}",
        report.start_date, report.end_date
    );
    println!("Steps:          {}", s.steps);
    println!("Policy:         {}", report.config.env.policy);
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", s.final_equity);
    println!("Final Cash:     {:.2}", s.final_cash);
    println!("Total Return:   {:.2}%", s.total_return_pct);
    println!("CAGR:           {:.2}%", s.cagr_pct);
    println!("Sharpe:         {:.3}", s.sharpe);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown_pct);
    println!("Fees Paid:      {:.2}", s.total_fees);
    println!("Turnover:       {:.1}x", s.turnover);
    println!("Fills:          {} buy / {} sell", s.buy_fills, s.sell_fills);
    if s.negative_cash_steps > 0 {
        println!();
        println!(
            "WARNING: cash went negative on {} step(s)",
            s.negative_cash_steps
        );
    }
    if report.is_synthetic() {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
    println!("{}", report.log);
}

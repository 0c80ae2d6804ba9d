//! Integration tests for the runner: TOML config → data → run → artifacts.
//!
//! Uses the frozen CSV fixtures from `ratiolab-core/tests/fixtures`.

use std::path::PathBuf;

use ratiolab_runner::{
    export_json, import_json, load_artifacts, load_market_data, run, run_from_config,
    save_artifacts, DataSource, RunConfig, RunError,
};

fn core_fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("ratiolab-core/tests/fixtures")
}

/// Copy the fixtures into `{dir}/{SYMBOL}.csv` form.
fn setup_csv_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        core_fixture_dir().join("spy_2024q1_head.csv"),
        dir.path().join("SPY.csv"),
    )
    .unwrap();
    std::fs::copy(
        core_fixture_dir().join("tlt_2024q1_head.csv"),
        dir.path().join("TLT.csv"),
    )
    .unwrap();
    dir
}

fn csv_config(dir: &std::path::Path, extra_env: &str) -> RunConfig {
    let toml = format!(
        r#"
        [env]
        cash = 100000.0
        fee = 0.001
        adj_close = [true, true]
        {extra_env}

        [data]
        source = "csv"
        dir = "{}"
        symbols = ["SPY", "TLT"]

        [strategy]
        weights = [0.6, 0.4]
        cash_reserve = 0.05
        long_threshold = 250.0
        short_threshold = -250.0
        rebalance_every = 2
        "#,
        dir.display().to_string().replace('\\', "/")
    );
    RunConfig::from_toml(&toml).unwrap()
}

#[test]
fn csv_run_end_to_end() {
    let dir = setup_csv_dir();
    let config = csv_config(dir.path(), "");
    let report = run_from_config(&config).unwrap();

    assert_eq!(report.source, DataSource::Csv);
    assert_eq!(report.symbols, vec!["SPY", "TLT"]);
    assert_eq!(report.start_date, "2024-01-02");
    assert_eq!(report.end_date, "2024-01-12");
    // 9 shared dates → 8 steps
    assert_eq!(report.summary.steps, 8);
    assert!(report.summary.buy_fills >= 2);
    assert!(report.summary.total_fees > 0.0);
    // The initial allocation is fully invested, so its fee overdraws cash
    assert!(report.log.cash[0] < 0.0);
    assert!(report.summary.negative_cash_steps >= 1);
    assert_eq!(
        report.summary.final_equity,
        *report.log.equity.last().unwrap()
    );
}

#[test]
fn same_config_same_result() {
    let dir = setup_csv_dir();
    let config = csv_config(dir.path(), "");
    let a = run_from_config(&config).unwrap();
    let b = run_from_config(&config).unwrap();
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.summary, b.summary);
}

#[test]
fn enforced_solvency_surfaces_engine_error() {
    let dir = setup_csv_dir();
    let config = csv_config(dir.path(), "solvency = \"enforce\"");
    let loaded = load_market_data(&config.data).unwrap();
    let err = run(&config, &loaded).unwrap_err();
    assert!(matches!(err, RunError::Engine(_)));
    assert!(err.to_string().contains("solvency"));
}

#[test]
fn artifacts_written_and_reloaded() {
    let dir = setup_csv_dir();
    let out = tempfile::tempdir().unwrap();
    let report = run_from_config(&csv_config(dir.path(), "")).unwrap();

    save_artifacts(&report, out.path()).unwrap();
    let equity_csv = std::fs::read_to_string(out.path().join("equity.csv")).unwrap();
    assert_eq!(equity_csv.lines().count(), 9);

    let loaded = load_artifacts(out.path()).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.log.fills, report.log.fills);
}

#[test]
fn shipped_demo_config_runs() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("configs/demo.toml");
    let config = RunConfig::from_file(&path).unwrap();
    let report = run_from_config(&config).unwrap();
    assert!(report.is_synthetic());
    assert_eq!(report.summary.steps, 503);
}

#[test]
fn idle_instrument_in_full_allocation_survives_json() {
    let toml = r#"
        [env]
        cash = 1000.0
        fee = 0.0

        [data]
        source = "synthetic"
        symbols = ["AAA", "BBB"]
        start = "2024-01-01"
        days = 5
        seed = 3

        [strategy]
        weights = [1.0, 0.0]
    "#;
    let report = run_from_config(&RunConfig::from_toml(toml).unwrap()).unwrap();
    // Cash is spent down to zero and BBB stays flat: 0 / 0
    assert!(report.log.return_ratios.iter().any(|row| row[1].is_nan()));

    let restored = import_json(&export_json(&report).unwrap()).unwrap();
    assert_eq!(restored.log.len(), report.log.len());
    for (got, want) in restored
        .log
        .return_ratios
        .iter()
        .flatten()
        .zip(report.log.return_ratios.iter().flatten())
    {
        assert!(got == want || (got.is_nan() && want.is_nan()));
    }
    assert_eq!(restored.summary.steps, report.summary.steps);
    assert!((restored.summary.final_equity - report.summary.final_equity).abs() < 1e-9);

    let out = tempfile::tempdir().unwrap();
    save_artifacts(&report, out.path()).unwrap();
    assert!(load_artifacts(out.path()).is_ok());
}

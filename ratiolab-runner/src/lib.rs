//! RatioLab Runner — run configuration, data loading, rebalancing driver,
//! metrics, and export.
//!
//! This crate builds on `ratiolab-core` to provide:
//! - TOML run configs with a content-addressed run id
//! - Data loading from CSV directories or seeded synthetic walks
//! - A constant-weight rebalancing driver over `TradingEnv`
//! - Summary metrics and JSON/CSV/Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{ConfigError, DataConfig, RunConfig, RunId, StrategyConfig};
pub use data_loader::{compute_dataset_hash, load_market_data, DataSource, LoadError, LoadedData};
pub use export::{
    export_equity_csv, export_fills_csv, export_json, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use metrics::RunSummary;
pub use runner::{run, run_from_config, RunError, RunReport, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_config_is_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
    }

    #[test]
    fn run_report_is_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
    }

    #[test]
    fn loaded_data_is_send_sync() {
        assert_send::<LoadedData>();
        assert_sync::<LoadedData>();
    }

    #[test]
    fn run_summary_is_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
    }
}

//! Property tests for run metrics over real engine runs.

use chrono::NaiveDate;
use proptest::prelude::*;
use ratiolab_core::engine::EnvConfig;
use ratiolab_runner::{run_from_config, DataConfig, RunConfig, StrategyConfig};

fn config(weights: Vec<f64>, fee: f64, seed: u64, rebalance_every: usize) -> RunConfig {
    RunConfig {
        env: EnvConfig::new(50_000.0, fee),
        data: DataConfig::Synthetic {
            symbols: (0..weights.len()).map(|i| format!("S{i}")).collect(),
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            days: 40,
            seed,
        },
        strategy: StrategyConfig {
            weights,
            cash_reserve: 0.1,
            long_threshold: 0.0,
            short_threshold: 0.0,
            rebalance_every,
            initial_allocation: None,
        },
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Summary totals agree with the step log they were computed from.
    #[test]
    fn summary_matches_log(
        weights in prop::collection::vec(0.0..3.0_f64, 1..4),
        fee in 0.0..0.01_f64,
        seed in any::<u64>(),
        rebalance_every in 1usize..10,
    ) {
        let report = run_from_config(&config(weights.clone(), fee, seed, rebalance_every)).unwrap();
        let s = &report.summary;

        prop_assert_eq!(s.steps, report.log.len());
        prop_assert_eq!(s.steps, 39);
        prop_assert!(s.max_drawdown_pct <= 0.0);
        prop_assert!(s.total_fees >= -1e-9);
        if fee == 0.0 {
            prop_assert!(s.total_fees.abs() < 1e-6);
        }
        let fills: usize = report.log.fills.iter().map(|row| row.len()).sum();
        prop_assert_eq!(fills, 39 * weights.len());
        prop_assert!(s.buy_fills + s.sell_fills <= fills);
    }
}

//! Deterministic synthetic bars for development and tests.
//!
//! A weekday-only random walk starting at 100.0. The RNG seed is derived from
//! `(seed, symbol)` with BLAKE3, so each symbol gets its own path and the same
//! inputs always reproduce the same bars.

use crate::domain::Bar;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START_PRICE: f64 = 100.0;
const MAX_DAILY_MOVE: f64 = 0.03;

/// Generate `days` trading-day bars for `symbol`, starting on or after `start`.
pub fn synthetic_bars(symbol: &str, start: NaiveDate, days: usize, seed: u64) -> Vec<Bar> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());

    let mut bars = Vec::with_capacity(days);
    let mut price = START_PRICE;
    let mut current = start;

    while bars.len() < days {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-MAX_DAILY_MOVE..MAX_DAILY_MOVE);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            adj_close: close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

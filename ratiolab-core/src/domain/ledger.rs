//! Instrument ledger — one traded symbol's position and pending order.

use super::order::{Order, OrderSide};
use crate::data::PriceSeries;
use chrono::NaiveDate;
use std::sync::Arc;

/// Position value (in currency) and the single pending order for one symbol.
///
/// The price series is shared read-only with the market data it came from.
/// Price accessors take the engine's current day; `next_*` reads `day + 1`.
/// They return `None` past the end of the series.
#[derive(Debug, Clone)]
pub struct InstrumentLedger {
    symbol: String,
    series: Arc<PriceSeries>,
    use_adj_close: bool,
    position: f64,
    order: Option<Order>,
}

impl InstrumentLedger {
    pub fn new(symbol: impl Into<String>, series: Arc<PriceSeries>, use_adj_close: bool) -> Self {
        Self {
            symbol: symbol.into(),
            series,
            use_adj_close,
            position: 0.0,
            order: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn uses_adj_close(&self) -> bool {
        self.use_adj_close
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Record a pending order, replacing any unconsumed one.
    pub fn set_order(&mut self, side: OrderSide, size: f64) {
        self.order = Some(Order { side, size });
    }

    pub fn buy(&mut self, size: f64) {
        self.set_order(OrderSide::Long, size);
    }

    pub fn sell(&mut self, size: f64) {
        self.set_order(OrderSide::Short, size);
    }

    pub fn cancel(&mut self) {
        self.order = None;
    }

    /// Flat position, no pending order.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.cancel();
    }

    pub fn last_close(&self, day: usize) -> Option<f64> {
        self.series.close(day, self.use_adj_close)
    }

    pub fn next_close(&self, day: usize) -> Option<f64> {
        self.series.close(day + 1, self.use_adj_close)
    }

    pub fn last_open(&self, day: usize) -> Option<f64> {
        self.series.open(day)
    }

    pub fn next_open(&self, day: usize) -> Option<f64> {
        self.series.open(day + 1)
    }

    pub fn last_volume(&self, day: usize) -> Option<u64> {
        self.series.volume(day)
    }

    pub fn last_day(&self, day: usize) -> Option<NaiveDate> {
        self.series.date(day)
    }

    /// Close-to-close ratio from `day` to `day + 1`.
    pub fn price_ratio(&self, day: usize) -> Option<f64> {
        Some(self.next_close(day)? / self.last_close(day)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;

    fn ledger(adjusted: bool) -> InstrumentLedger {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = vec![
            Bar {
                date: base,
                open: 99.0,
                high: 101.0,
                low: 98.0,
                close: 100.0,
                adj_close: 50.0,
                volume: 10,
            },
            Bar {
                date: base + chrono::Duration::days(1),
                open: 104.0,
                high: 111.0,
                low: 103.0,
                close: 110.0,
                adj_close: 60.0,
                volume: 20,
            },
        ];
        let series = Arc::new(PriceSeries::new("SPY", bars).unwrap());
        InstrumentLedger::new("SPY", series, adjusted)
    }

    #[test]
    fn set_order_overwrites() {
        let mut l = ledger(false);
        l.buy(100.0);
        l.sell(40.0);
        assert_eq!(l.order(), Some(&Order::short(40.0)));
    }

    #[test]
    fn cancel_clears_order() {
        let mut l = ledger(false);
        l.buy(100.0);
        l.cancel();
        assert!(l.order().is_none());
        // Cancelling an empty ledger is a no-op
        l.cancel();
        assert!(l.order().is_none());
    }

    #[test]
    fn reset_flattens() {
        let mut l = ledger(false);
        l.set_position(250.0);
        l.buy(10.0);
        l.reset();
        assert_eq!(l.position(), 0.0);
        assert!(l.order().is_none());
    }

    #[test]
    fn price_accessors_follow_day() {
        let l = ledger(false);
        assert_eq!(l.last_close(0), Some(100.0));
        assert_eq!(l.next_close(0), Some(110.0));
        assert_eq!(l.last_open(0), Some(99.0));
        assert_eq!(l.next_open(0), Some(104.0));
        assert_eq!(l.last_volume(1), Some(20));
        assert_eq!(l.last_day(1), NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(l.next_close(1), None);
        assert!((l.price_ratio(0).unwrap() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn adjusted_close_drives_ratio() {
        let l = ledger(true);
        assert_eq!(l.last_close(0), Some(50.0));
        assert!((l.price_ratio(0).unwrap() - 1.2).abs() < 1e-12);
        assert_eq!(l.price_ratio(1), None);
    }
}

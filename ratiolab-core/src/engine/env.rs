//! The day-stepping trading environment.
//!
//! `TradingEnv` owns the clock, the cash balance and one [`InstrumentLedger`]
//! per symbol. Callers alternate [`TradingEnv::action`] (set orders from
//! target weights) and [`TradingEnv::step`] (settle orders against the
//! next day's close) until the returned outcome reports `done`.

use super::allocator::{allocate, ActionParams};
use super::config::{EnvConfig, SolvencyCheck};
use super::error::EngineError;
use super::log::{StepLog, StepRecord};
use super::settlement::{Settlement, SettlementPolicy};
use crate::data::MarketData;
use crate::domain::InstrumentLedger;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Relative slack below zero before cash counts as overdrawn.
const SOLVENCY_TOLERANCE: f64 = 1e-12;

/// Multi-instrument settlement engine over aligned daily prices.
#[derive(Debug, Clone)]
pub struct TradingEnv {
    day: usize,
    cash: f64,
    initial_cash: f64,
    fee: f64,
    leverage: f64,
    policy: SettlementPolicy,
    solvency: SolvencyCheck,
    length: usize,
    ledgers: Vec<InstrumentLedger>,
    log: StepLog,
}

/// Result of one [`TradingEnv::step`].
///
/// Borrows the environment, so it has to be consumed before the next step.
#[derive(Debug)]
pub struct StepOutcome<'a> {
    /// Per-ledger return ratios of this step, in ledger order.
    pub returns: Vec<f64>,
    /// True once the clock has reached the last price row.
    pub done: bool,
    env: &'a TradingEnv,
}

impl<'a> StepOutcome<'a> {
    /// Closes at the environment's current day.
    pub fn closes(&self) -> Vec<f64> {
        self.env.last_closes()
    }

    pub fn log(&self) -> &'a StepLog {
        &self.env.log
    }
}

impl TradingEnv {
    /// Build an environment over `data` and reset it with no allocation.
    pub fn new(config: EnvConfig, data: &MarketData) -> Result<Self, EngineError> {
        config.validate()?;
        if data.symbols().is_empty() {
            return Err(EngineError::EmptyUniverse);
        }
        let flags = config.adj_close_flags(data.symbols().len())?;

        let ledgers = data
            .symbols()
            .iter()
            .zip(flags)
            .map(|(symbol, adjusted)| {
                let series = data
                    .series(symbol)
                    .ok_or_else(|| EngineError::MissingSeries(symbol.clone()))?;
                Ok(InstrumentLedger::new(symbol.clone(), series.clone(), adjusted))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut env = Self {
            day: 0,
            cash: config.cash,
            initial_cash: config.cash,
            fee: config.fee,
            leverage: config.leverage,
            policy: config.policy,
            solvency: config.solvency,
            length: data.length(),
            ledgers,
            log: StepLog::new(),
        };
        env.reset(None)?;
        Ok(env)
    }

    /// Rewind to day 0 with the initial cash, flat ledgers and an empty log,
    /// then place orders for `init_allocation` (all zero when `None`).
    pub fn reset(&mut self, init_allocation: Option<&[f64]>) -> Result<(), EngineError> {
        let zeros;
        let weights = match init_allocation {
            Some(w) => w,
            None => {
                zeros = vec![0.0; self.ledgers.len()];
                &zeros
            }
        };
        // Orders are computed against flat ledgers before anything is mutated
        let flat: Vec<InstrumentLedger> = self
            .ledgers
            .iter()
            .cloned()
            .map(|mut l| {
                l.reset();
                l
            })
            .collect();
        let orders = allocate(self.initial_cash, &flat, weights, &ActionParams::default())?;

        self.day = 0;
        self.cash = self.initial_cash;
        self.log.reset();
        self.ledgers = flat;
        for (ledger, order) in self.ledgers.iter_mut().zip(orders) {
            if let Some(order) = order {
                ledger.set_order(order.side, order.size);
            }
        }
        debug!(
            cash = self.cash,
            symbols = self.ledgers.len(),
            length = self.length,
            "environment reset"
        );
        Ok(())
    }

    /// Translate target weights into pending orders. Ledgers whose delta
    /// lands in the neutral zone keep their current order.
    pub fn action(&mut self, weights: &[f64], params: &ActionParams) -> Result<(), EngineError> {
        let orders = allocate(self.cash, &self.ledgers, weights, params)?;
        for (ledger, order) in self.ledgers.iter_mut().zip(orders) {
            if let Some(order) = order {
                ledger.set_order(order.side, order.size);
            }
        }
        Ok(())
    }

    /// Settle every pending order against today's close-to-close move and
    /// advance the clock by one day.
    pub fn step(&mut self) -> Result<StepOutcome<'_>, EngineError> {
        let out_of_range = EngineError::DayOutOfRange {
            day: self.day,
            length: self.length,
        };
        let date = self.current_date().ok_or_else(|| out_of_range.clone())?;

        let mut settlements: Vec<Settlement> = Vec::with_capacity(self.ledgers.len());
        for ledger in &self.ledgers {
            let ratio = ledger
                .price_ratio(self.day)
                .ok_or_else(|| out_of_range.clone())?;
            settlements.push(
                self.policy
                    .settle(ledger.position(), ledger.order(), ratio, self.fee),
            );
        }

        let spent: f64 = settlements.iter().map(|s| s.entry_cash).sum();
        let next_cash = self.cash - spent;
        // Allocator targets can overshoot cash by a few ulps
        let tolerance = SOLVENCY_TOLERANCE * self.initial_cash.max(spent.abs());
        if next_cash < -tolerance {
            match self.solvency {
                SolvencyCheck::Enforce => return Err(EngineError::Insolvent { cash: next_cash }),
                SolvencyCheck::Off => {
                    warn!(day = self.day, cash = next_cash, "cash went negative");
                }
            }
        }

        let cash = self.cash;
        let mut record = StepRecord {
            date,
            position_diffs: Vec::with_capacity(settlements.len()),
            return_ratios: Vec::with_capacity(settlements.len()),
            equity: 0.0,
            entry_cash: Vec::with_capacity(settlements.len()),
            entries: Vec::with_capacity(settlements.len()),
            fills: Vec::with_capacity(settlements.len()),
            cash: next_cash,
        };
        for (ledger, s) in self.ledgers.iter().zip(&settlements) {
            let position = ledger.position();
            record.position_diffs.push(s.next_position - position);
            record
                .return_ratios
                .push((cash - s.entry_cash + s.next_position) / (cash + position));
            record.entry_cash.push(s.entry_cash);
            record.entries.push(s.entry);
            record.fills.push(s.fill);
        }

        self.cash = next_cash;
        self.day += 1;
        for (ledger, s) in self.ledgers.iter_mut().zip(&settlements) {
            ledger.set_position(s.next_position);
            ledger.cancel();
        }
        record.equity = self.equity();
        let returns = record.return_ratios.clone();
        self.log.push(record);

        let done = self.day + 1 == self.length;
        debug!(
            day = self.day,
            cash = self.cash,
            equity = self.equity(),
            done,
            "step settled"
        );

        Ok(StepOutcome {
            returns,
            done,
            env: self,
        })
    }

    /// Cash plus the sum of all positions.
    pub fn equity(&self) -> f64 {
        self.cash + self.ledgers.iter().map(InstrumentLedger::position).sum::<f64>()
    }

    /// Rendering is left to callers; the log's `Display` covers diagnostics.
    pub fn render(&self) {}

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn solvency(&self) -> SolvencyCheck {
        self.solvency
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.ledgers.iter().map(InstrumentLedger::symbol).collect()
    }

    pub fn ledgers(&self) -> &[InstrumentLedger] {
        &self.ledgers
    }

    pub fn log(&self) -> &StepLog {
        &self.log
    }

    /// Close of every ledger at the current day, in ledger order.
    pub fn last_closes(&self) -> Vec<f64> {
        self.ledgers
            .iter()
            .filter_map(|l| l.last_close(self.day))
            .collect()
    }

    /// Date of the first ledger at the current day.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.ledgers.first()?.last_day(self.day)
    }
}

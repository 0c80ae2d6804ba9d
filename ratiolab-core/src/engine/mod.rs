//! Settlement engine — the day-stepping environment and its parts.
//!
//! Each step runs in three phases:
//!
//! 1. Snapshot: every ledger is settled against the pre-step state
//! 2. Check: day bounds and (optionally) solvency, before anything moves
//! 3. Apply: cash, day, positions and the log advance together

pub mod allocator;
pub mod config;
pub mod env;
pub mod error;
pub mod log;
pub mod settlement;

pub use allocator::{allocate, ActionParams};
pub use config::{EnvConfig, SolvencyCheck, MAX_FEE};
pub use env::{StepOutcome, TradingEnv};
pub use error::EngineError;
pub use log::{StepLog, StepRecord};
pub use settlement::{Settlement, SettlementPolicy};

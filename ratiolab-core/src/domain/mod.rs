//! Domain types for RatioLab

pub mod bar;
pub mod ledger;
pub mod order;

pub use bar::Bar;
pub use ledger::InstrumentLedger;
pub use order::{FillSide, Order, OrderSide};

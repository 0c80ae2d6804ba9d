//! RatioLab Core — multi-instrument portfolio settlement, one day at a time.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (bars, orders, instrument ledgers)
//! - Market data (validated series, CSV ingestion, alignment, synthetic bars)
//! - The trading environment: allocator, settlement step and step log

pub mod data;
pub mod domain;
pub mod engine;

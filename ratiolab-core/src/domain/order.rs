//! Pending order for the current step, and the fill direction it produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a pending order moves the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    /// Adds `size` of notional to the position.
    Long,
    /// Removes `size` of notional from the position.
    Short,
}

/// A single-step order: currency-denominated size plus direction.
///
/// An instrument with no order is represented by `Option<Order>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub side: OrderSide,
    pub size: f64,
}

impl Order {
    pub fn long(size: f64) -> Self {
        Self {
            side: OrderSide::Long,
            size,
        }
    }

    pub fn short(size: f64) -> Self {
        Self {
            side: OrderSide::Short,
            size,
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == OrderSide::Long
    }
}

/// What happened to an instrument during a step.
///
/// The numeric codes (`Buy = 0`, `Hold = 1`, `Sell = 2`) are stable and used
/// by tabular exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillSide {
    Buy,
    Hold,
    Sell,
}

impl FillSide {
    pub fn code(self) -> u8 {
        match self {
            FillSide::Buy => 0,
            FillSide::Hold => 1,
            FillSide::Sell => 2,
        }
    }
}

impl From<Option<&Order>> for FillSide {
    fn from(order: Option<&Order>) -> Self {
        match order.map(|o| o.side) {
            None => FillSide::Hold,
            Some(OrderSide::Long) => FillSide::Buy,
            Some(OrderSide::Short) => FillSide::Sell,
        }
    }
}

impl fmt::Display for FillSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FillSide::Buy => "buy",
            FillSide::Hold => "hold",
            FillSide::Sell => "sell",
        };
        f.write_str(label)
    }
}

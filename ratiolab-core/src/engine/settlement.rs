//! Settlement policies: how a pending order turns into cash and position.

use crate::domain::{FillSide, Order, OrderSide};
use crate::engine::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The settlement variants the engine knows, selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Positions are currency values marked by the close-to-close ratio;
    /// orders add or remove notional before marking.
    #[default]
    RatioTrade,
}

/// Result of settling one instrument for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// Cash spent by the fill (negative when cash is received).
    pub entry_cash: f64,
    /// Order size that was filled, 0 when there was no order.
    pub entry: f64,
    pub next_position: f64,
    pub fill: FillSide,
}

impl SettlementPolicy {
    pub fn name(self) -> &'static str {
        match self {
            SettlementPolicy::RatioTrade => "ratio_trade",
        }
    }

    /// Settle a single instrument from its pre-step snapshot.
    ///
    /// Fees always cost the trader: buys pay `size * (1 + fee)`, sells
    /// receive `size * (1 - fee)`.
    pub fn settle(self, position: f64, order: Option<&Order>, ratio: f64, fee: f64) -> Settlement {
        match self {
            SettlementPolicy::RatioTrade => settle_ratio(position, order, ratio, fee),
        }
    }
}

fn settle_ratio(position: f64, order: Option<&Order>, ratio: f64, fee: f64) -> Settlement {
    let fill = FillSide::from(order);
    match order {
        None => Settlement {
            entry_cash: 0.0,
            entry: 0.0,
            next_position: position * ratio,
            fill,
        },
        Some(Order {
            side: OrderSide::Long,
            size,
        }) => Settlement {
            entry_cash: size * (1.0 + fee),
            entry: *size,
            next_position: (position + size) * ratio,
            fill,
        },
        Some(Order {
            side: OrderSide::Short,
            size,
        }) => Settlement {
            entry_cash: -size * (1.0 - fee),
            entry: *size,
            next_position: (position - size) * ratio,
            fill,
        },
    }
}

impl FromStr for SettlementPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ratio_trade" => Ok(SettlementPolicy::RatioTrade),
            other => Err(EngineError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for SettlementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

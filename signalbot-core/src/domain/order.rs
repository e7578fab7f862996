//! Order placement results, venue order snapshots and balances.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "Buy"),
            OrderSide::Sell => write!(f, "Sell"),
        }
    }
}

/// A completed execution reported at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    /// Base-currency amount filled.
    pub quantity: f64,
    /// Price per unit, in quote currency.
    pub price: f64,
    /// Fee charged, in quote currency.
    pub commission: f64,
}

/// What a venue answered to a limit order.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Accepted and resting; poll with the id until it closes.
    Open(OrderId),
    /// Filled on the spot (simulated venues).
    Filled(Fill),
}

/// The venue's view of one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order_id: OrderId,
    pub side: OrderSide,
    /// Still resting on the book.
    pub is_open: bool,
    /// A cancel was requested. Checked only once the order is closed.
    pub cancel_initiated: bool,
    /// Requested base-currency amount.
    pub quantity: f64,
    pub limit_price: f64,
    /// Fee charged so far, in quote currency.
    pub commission_paid: f64,
}

/// Available amount of one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    /// Free to trade; excludes amounts held by open orders.
    pub available: f64,
}

impl Balance {
    pub fn new(currency: impl Into<String>, available: f64) -> Self {
        Self {
            currency: currency.into(),
            available,
        }
    }
}

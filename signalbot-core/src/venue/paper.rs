//! Simulated venue: every limit order fills immediately at its limit price.

use std::sync::Mutex;

use tracing::debug;

use super::{OrderApiError, OrderExecutor};
use crate::domain::{Balance, Fill, OrderId, OrderSide, OrderSnapshot, Placement};

/// One order accepted by the simulated venue.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub side: OrderSide,
    pub market: String,
    pub quantity: f64,
    pub price: f64,
}

/// Order executor that synthesizes fills instead of talking to an exchange.
///
/// Fills carry the `DEMO` order id and no commission. Balances are a fixed
/// table supplied at construction.
#[derive(Debug, Default)]
pub struct PaperExecutor {
    balances: Vec<Balance>,
    orders: Mutex<Vec<PaperOrder>>,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: Vec<Balance>) -> Self {
        Self {
            balances,
            orders: Mutex::new(Vec::new()),
        }
    }

    /// Orders accepted so far, oldest first.
    pub fn orders(&self) -> Vec<PaperOrder> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn fill(&self, side: OrderSide, market: &str, quantity: f64, price: f64) -> Placement {
        debug!(%side, market, quantity, price, "simulated fill");
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PaperOrder {
                side,
                market: market.to_string(),
                quantity,
                price,
            });
        Placement::Filled(Fill {
            order_id: OrderId::demo(),
            quantity,
            price,
            commission: 0.0,
        })
    }
}

impl OrderExecutor for PaperExecutor {
    fn name(&self) -> &str {
        "paper"
    }

    fn place_buy_limit(
        &self,
        market: &str,
        quantity: f64,
        price: f64,
    ) -> Result<Placement, OrderApiError> {
        Ok(self.fill(OrderSide::Buy, market, quantity, price))
    }

    fn place_sell_limit(
        &self,
        market: &str,
        quantity: f64,
        price: f64,
    ) -> Result<Placement, OrderApiError> {
        Ok(self.fill(OrderSide::Sell, market, quantity, price))
    }

    /// Simulated fills never rest on a book, so there is nothing to look up.
    fn order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderApiError> {
        Err(OrderApiError::UnknownOrder(order_id.clone()))
    }

    fn balance(&self, currency: &str) -> Result<Balance, OrderApiError> {
        Ok(self
            .balances
            .iter()
            .find(|b| b.currency == currency)
            .cloned()
            .unwrap_or_else(|| Balance::new(currency, 0.0)))
    }

    fn balances(&self) -> Result<Vec<Balance>, OrderApiError> {
        Ok(self.balances.clone())
    }
}

//! Market-facing collaborator traits and structured error types.
//!
//! `PriceSource` and `OrderExecutor` abstract over the exchange so the
//! evaluator can run against a live adapter, the simulated venue, or a mock.

pub mod paper;
pub mod quotes;

pub use paper::PaperExecutor;
pub use quotes::QuoteBoard;

use thiserror::Error;

use crate::domain::{Balance, OrderId, OrderSnapshot, Placement};

/// Why a price could not be obtained.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("no market summary for {market}")]
    UnknownMarket { market: String },

    #[error("unusable price {price} for {market}")]
    InvalidPrice { market: String, price: f64 },

    #[error("quote/USD rate unavailable")]
    RateUnavailable,

    #[error("price source unreachable: {0}")]
    Unreachable(String),
}

/// Errors from the order API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderApiError {
    /// The venue answered, but without an order identifier.
    #[error("response carried no order id: {response}")]
    MissingOrderId { response: String },

    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("no balance for {0}")]
    UnknownCurrency(String),

    #[error("order API unreachable: {0}")]
    Unreachable(String),
}

/// Last-traded prices and the quote currency's USD rate.
pub trait PriceSource: Send + Sync {
    /// Last traded price on `market`.
    fn last_price(&self, market: &str) -> Result<f64, PriceError>;

    /// USD value of one unit of quote currency.
    fn quote_usd_rate(&self) -> Result<f64, PriceError>;
}

/// Order placement, order lookup and balances.
///
/// Live adapters answer placements with [`Placement::Open`]; the simulated
/// venue answers with [`Placement::Filled`].
pub trait OrderExecutor: Send + Sync {
    /// Human-readable name of this venue.
    fn name(&self) -> &str;

    fn place_buy_limit(
        &self,
        market: &str,
        quantity: f64,
        price: f64,
    ) -> Result<Placement, OrderApiError>;

    fn place_sell_limit(
        &self,
        market: &str,
        quantity: f64,
        price: f64,
    ) -> Result<Placement, OrderApiError>;

    fn order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderApiError>;

    fn balance(&self, currency: &str) -> Result<Balance, OrderApiError>;

    fn balances(&self) -> Result<Vec<Balance>, OrderApiError>;
}

/// Fetch a price and reject values no order can be placed at.
pub fn usable_price(source: &dyn PriceSource, market: &str) -> Result<f64, PriceError> {
    let price = source.last_price(market)?;
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(PriceError::InvalidPrice {
            market: market.to_string(),
            price,
        })
    }
}

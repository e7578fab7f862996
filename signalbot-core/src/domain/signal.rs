//! The persisted trading signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{OrderId, SignalId};
use super::status::SignalStatus;

/// How a price level is expressed on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// Relative to a base price, in percent.
    Percent(f64),
    /// A literal price in quote currency.
    Absolute(f64),
}

/// One side's execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Fill price, or the limit price read back for a resting order.
    pub price: f64,
    /// Venue order id, or the demo id for simulated fills.
    pub order_id: OrderId,
    /// Fee in quote currency as reported at placement.
    pub commission: f64,
    /// When the order was placed.
    pub executed_at: DateTime<Utc>,
}

/// A recorded buy/sell intent on a market and everything learned while working it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    /// Venue market identifier, e.g. `BTC-ETH`.
    pub market: String,
    pub coin: String,
    /// Base-asset amount; written when a buy is recorded.
    #[serde(default)]
    pub quantity: f64,
    /// Quote-currency amount to spend on the buy.
    #[serde(alias = "btc")]
    pub quote_amount: f64,
    pub status: SignalStatus,

    #[serde(default)]
    pub buy: Option<Execution>,
    #[serde(default)]
    pub sell: Option<Execution>,

    #[serde(default)]
    pub win_percent: Option<f64>,
    #[serde(default)]
    pub win_price: Option<f64>,
    #[serde(default)]
    pub stop_loss_percent: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,

    #[serde(default)]
    pub highest_price: Option<f64>,
    #[serde(default)]
    pub lowest_price: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default, alias = "profit_btc")]
    pub profit_quote: Option<f64>,
    #[serde(default)]
    pub profit_percent: Option<f64>,

    pub chat_id: i64,
}

/// Reasons a signal cannot be accepted for processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalConfigError {
    #[error("market must not be empty")]
    EmptyMarket,
    #[error("coin must not be empty")]
    EmptyCoin,
    #[error("quote amount must be positive, got {0}")]
    NonPositiveQuoteAmount(f64),
    #[error("neither a target nor a stop-loss is set")]
    NoExitRule,
    #[error("{field} must be a positive finite number, got {value}")]
    InvalidLevel { field: &'static str, value: f64 },
    #[error("stop-loss percent must be below 100, got {0}")]
    StopLossPercentTooLarge(f64),
}

impl Signal {
    /// A fresh signal in the `PendingBuy` state with no exit rules yet.
    pub fn new(
        id: SignalId,
        market: impl Into<String>,
        coin: impl Into<String>,
        quote_amount: f64,
        chat_id: i64,
    ) -> Self {
        Self {
            id,
            market: market.into(),
            coin: coin.into(),
            quantity: 0.0,
            quote_amount,
            status: SignalStatus::PendingBuy,
            buy: None,
            sell: None,
            win_percent: None,
            win_price: None,
            stop_loss_percent: None,
            stop_loss: None,
            highest_price: None,
            lowest_price: None,
            current_price: None,
            profit_quote: None,
            profit_percent: None,
            chat_id,
        }
    }

    pub fn buy_price(&self) -> Option<f64> {
        self.buy.as_ref().map(|e| e.price)
    }

    pub fn sell_price(&self) -> Option<f64> {
        self.sell.as_ref().map(|e| e.price)
    }

    /// Target rule; a percentage wins over an absolute price.
    pub fn target_rule(&self) -> Option<Threshold> {
        match (self.win_percent, self.win_price) {
            (Some(pct), _) => Some(Threshold::Percent(pct)),
            (None, Some(price)) => Some(Threshold::Absolute(price)),
            (None, None) => None,
        }
    }

    /// Stop-loss rule; a percentage wins over an absolute price.
    pub fn stop_loss_rule(&self) -> Option<Threshold> {
        match (self.stop_loss_percent, self.stop_loss) {
            (Some(pct), _) => Some(Threshold::Percent(pct)),
            (None, Some(price)) => Some(Threshold::Absolute(price)),
            (None, None) => None,
        }
    }

    /// Fold an observed price into the running extremes and the last-seen price.
    pub fn observe_price(&mut self, price: f64) {
        if self.highest_price.map_or(true, |high| high < price) {
            self.highest_price = Some(price);
        }
        if self.lowest_price.map_or(true, |low| low > price) {
            self.lowest_price = Some(price);
        }
        self.current_price = Some(price);
    }

    /// Intake validation for signals created outside the evaluator.
    ///
    /// The evaluator itself tolerates missing rules; this is for callers that
    /// want to refuse such signals up front.
    pub fn validate(&self) -> Result<(), SignalConfigError> {
        if self.market.trim().is_empty() {
            return Err(SignalConfigError::EmptyMarket);
        }
        if self.coin.trim().is_empty() {
            return Err(SignalConfigError::EmptyCoin);
        }
        if !(self.quote_amount.is_finite() && self.quote_amount > 0.0) {
            return Err(SignalConfigError::NonPositiveQuoteAmount(self.quote_amount));
        }
        if self.target_rule().is_none() && self.stop_loss_rule().is_none() {
            return Err(SignalConfigError::NoExitRule);
        }

        let levels = [
            ("win_percent", self.win_percent),
            ("win_price", self.win_price),
            ("stop_loss_percent", self.stop_loss_percent),
            ("stop_loss", self.stop_loss),
        ];
        for (field, value) in levels {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(SignalConfigError::InvalidLevel { field, value });
                }
            }
        }
        if let Some(pct) = self.stop_loss_percent {
            if pct >= 100.0 {
                return Err(SignalConfigError::StopLossPercentTooLarge(pct));
            }
        }
        Ok(())
    }
}

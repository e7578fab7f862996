//! In-memory price table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PriceError, PriceSource};

/// A fixed table of last prices plus an optional quote/USD rate.
///
/// Used as the price source for simulated runs fed from a quotes file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteBoard {
    #[serde(default)]
    pub usd_rate: Option<f64>,
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, market: impl Into<String>, price: f64) -> Self {
        self.prices.insert(market.into(), price);
        self
    }

    pub fn with_usd_rate(mut self, rate: f64) -> Self {
        self.usd_rate = Some(rate);
        self
    }

    pub fn set_price(&mut self, market: impl Into<String>, price: f64) {
        self.prices.insert(market.into(), price);
    }
}

impl PriceSource for QuoteBoard {
    fn last_price(&self, market: &str) -> Result<f64, PriceError> {
        self.prices
            .get(market)
            .copied()
            .ok_or_else(|| PriceError::UnknownMarket {
                market: market.to_string(),
            })
    }

    fn quote_usd_rate(&self) -> Result<f64, PriceError> {
        self.usd_rate.ok_or(PriceError::RateUnavailable)
    }
}

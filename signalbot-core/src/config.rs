//! Evaluator configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorConfigError {
    #[error("quote currency must not be empty")]
    EmptyQuoteCurrency,
    #[error("safe_order_pct must be in [0, 100), got {0}")]
    SafeOrderPctOutOfRange(f64),
}

/// Settings the evaluator needs for every signal it processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Currency trades are priced and settled in.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Percent shaved off the market price when placing a sell.
    #[serde(default = "default_safe_order_pct")]
    pub safe_order_pct: f64,
}

fn default_quote_currency() -> String {
    "BTC".to_string()
}

fn default_safe_order_pct() -> f64 {
    0.5
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            quote_currency: default_quote_currency(),
            safe_order_pct: default_safe_order_pct(),
        }
    }
}

impl EvaluatorConfig {
    pub fn validate(&self) -> Result<(), EvaluatorConfigError> {
        if self.quote_currency.trim().is_empty() {
            return Err(EvaluatorConfigError::EmptyQuoteCurrency);
        }
        if !(0.0..100.0).contains(&self.safe_order_pct) {
            return Err(EvaluatorConfigError::SafeOrderPctOutOfRange(
                self.safe_order_pct,
            ));
        }
        Ok(())
    }

    /// Market identifier for trading `coin` against the quote currency.
    pub fn market_for(&self, coin: &str) -> String {
        format!("{}-{}", self.quote_currency, coin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EvaluatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.market_for("ETH"), "BTC-ETH");
    }

    #[test]
    fn safe_order_pct_range() {
        let mut config = EvaluatorConfig::default();
        config.safe_order_pct = 100.0;
        assert_eq!(
            config.validate(),
            Err(EvaluatorConfigError::SafeOrderPctOutOfRange(100.0))
        );
        config.safe_order_pct = -0.1;
        assert!(config.validate().is_err());
        config.safe_order_pct = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_quote_currency_rejected() {
        let config = EvaluatorConfig {
            quote_currency: " ".into(),
            ..EvaluatorConfig::default()
        };
        assert_eq!(config.validate(), Err(EvaluatorConfigError::EmptyQuoteCurrency));
    }
}

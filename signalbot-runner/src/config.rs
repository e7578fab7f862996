//! Bot configuration loaded from TOML.
//!
//! ```toml
//! [trading]
//! quote_currency = "BTC"
//! safe_order_pct = 0.5
//! mode = "simulated"
//! auto_buy = true
//!
//! [store]
//! path = "signals.json"
//!
//! [quotes]
//! path = "quotes.toml"
//!
//! [[paper.balances]]
//! currency = "BTC"
//! available = 1.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signalbot_core::domain::Balance;
use signalbot_core::venue::PaperExecutor;
use signalbot_core::{EvaluatorConfig, EvaluatorConfigError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorConfigError),

    #[error("live trading needs an exchange adapter, and none is linked into this build")]
    LiveModeUnavailable,

    #[error("paper balance for {currency} must be a non-negative number, got {available}")]
    InvalidPaperBalance { currency: String, available: f64 },
}

/// Whether orders go to an exchange or are filled on the spot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Simulated,
    Live,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    #[serde(flatten)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub mode: TradingMode,
    /// Place buys for pending signals during a tick.
    #[serde(default)]
    pub auto_buy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("signals.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotesConfig {
    #[serde(default = "default_quotes_path")]
    pub path: PathBuf,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            path: default_quotes_path(),
        }
    }
}

fn default_quotes_path() -> PathBuf {
    PathBuf::from("quotes.toml")
}

/// Starting balances of the simulated venue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    #[serde(default)]
    pub balances: Vec<Balance>,
}

/// Everything the runner and CLI need to assemble an evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub paper: PaperConfig,
}

impl BotConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. Relative store and quotes paths are resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            config.store.path = dir.join(&config.store.path);
            config.quotes.path = dir.join(&config.quotes.path);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trading.evaluator.validate()?;
        for balance in &self.paper.balances {
            if !(balance.available.is_finite() && balance.available >= 0.0) {
                return Err(ConfigError::InvalidPaperBalance {
                    currency: balance.currency.clone(),
                    available: balance.available,
                });
            }
        }
        Ok(())
    }

    /// The order executor for the configured mode.
    pub fn build_executor(&self) -> Result<PaperExecutor, ConfigError> {
        match self.trading.mode {
            TradingMode::Simulated => Ok(PaperExecutor::with_balances(
                self.paper.balances.clone(),
            )),
            TradingMode::Live => Err(ConfigError::LiveModeUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = BotConfig::from_toml("").unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.trading.evaluator.quote_currency, "BTC");
        assert_eq!(config.trading.evaluator.safe_order_pct, 0.5);
        assert_eq!(config.trading.mode, TradingMode::Simulated);
        assert!(!config.trading.auto_buy);
        assert_eq!(config.store.path, PathBuf::from("signals.json"));
    }

    #[test]
    fn full_document() {
        let toml = r#"
            [trading]
            quote_currency = "USDT"
            safe_order_pct = 1.0
            auto_buy = true

            [store]
            path = "data/signals.json"

            [quotes]
            path = "data/quotes.toml"

            [[paper.balances]]
            currency = "USDT"
            available = 1000.0

            [[paper.balances]]
            currency = "ETH"
            available = 0.5
        "#;
        let config = BotConfig::from_toml(toml).unwrap();
        assert_eq!(config.trading.evaluator.quote_currency, "USDT");
        assert_eq!(config.trading.evaluator.safe_order_pct, 1.0);
        assert!(config.trading.auto_buy);
        assert_eq!(config.paper.balances.len(), 2);
        assert_eq!(config.quotes.path, PathBuf::from("data/quotes.toml"));
        assert!(config.build_executor().is_ok());
    }

    #[test]
    fn invalid_safe_order_pct_is_rejected() {
        let err = BotConfig::from_toml("[trading]\nsafe_order_pct = 100.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Evaluator(_)));
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = BotConfig::from_toml("[trading]\nmode = \"margin\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn live_mode_has_no_executor() {
        let config = BotConfig::from_toml("[trading]\nmode = \"live\"\n").unwrap();
        assert_eq!(config.trading.mode, TradingMode::Live);
        assert!(matches!(
            config.build_executor(),
            Err(ConfigError::LiveModeUnavailable)
        ));
    }

    #[test]
    fn negative_paper_balance_is_rejected() {
        let toml = "[[paper.balances]]\ncurrency = \"BTC\"\navailable = -1.0\n";
        assert!(matches!(
            BotConfig::from_toml(toml),
            Err(ConfigError::InvalidPaperBalance { .. })
        ));
    }
}

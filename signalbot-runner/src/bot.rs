//! Assembles the collaborators named by a [`BotConfig`].

use thiserror::Error;

use signalbot_core::notify::Notifier;
use signalbot_core::venue::{PaperExecutor, QuoteBoard};
use signalbot_core::{EvaluatorError, SignalEvaluator};

use crate::config::{BotConfig, ConfigError};
use crate::quotes::{load_quotes, QuotesError};
use crate::store::JsonSignalStore;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Quotes(#[from] QuotesError),
}

/// Config plus the store, price table and venue it points at.
#[derive(Debug)]
pub struct Bot {
    pub config: BotConfig,
    pub store: JsonSignalStore,
    pub quotes: QuoteBoard,
    pub executor: PaperExecutor,
}

impl Bot {
    pub fn from_config(config: BotConfig) -> Result<Self, BotError> {
        let executor = config.build_executor()?;
        let quotes = load_quotes(&config.quotes.path)?;
        let store = JsonSignalStore::open(config.store.path.clone());
        Ok(Self {
            config,
            store,
            quotes,
            executor,
        })
    }

    /// An evaluator over this bot's collaborators, reporting to `notifier`.
    pub fn evaluator<'a>(
        &'a self,
        notifier: &'a dyn Notifier,
    ) -> Result<SignalEvaluator<'a>, EvaluatorError> {
        SignalEvaluator::new(
            self.config.trading.evaluator.clone(),
            &self.quotes,
            &self.executor,
            notifier,
            &self.store,
        )
    }
}

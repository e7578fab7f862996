//! Signal intake: turn a user's request into a validated, stored signal.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use signalbot_core::domain::{Signal, SignalConfigError, SignalId};
use signalbot_core::store::{SignalStore, StoreError};
use signalbot_core::EvaluatorConfig;

use crate::store::next_id_after;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("invalid signal: {0}")]
    Invalid(#[from] SignalConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A signal as requested by a user, before it has an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSignal {
    pub coin: String,
    /// Defaults to the quote currency's market for `coin`.
    #[serde(default)]
    pub market: Option<String>,
    pub quote_amount: f64,
    #[serde(default)]
    pub win_percent: Option<f64>,
    #[serde(default)]
    pub win_price: Option<f64>,
    #[serde(default)]
    pub stop_loss_percent: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub chat_id: i64,
}

impl NewSignal {
    pub fn into_signal(
        self,
        id: SignalId,
        config: &EvaluatorConfig,
    ) -> Result<Signal, SignalConfigError> {
        let coin = self.coin.trim().to_uppercase();
        let market = self
            .market
            .map(|m| m.trim().to_uppercase())
            .unwrap_or_else(|| config.market_for(&coin));

        let mut signal = Signal::new(id, market, coin, self.quote_amount, self.chat_id);
        signal.win_percent = self.win_percent;
        signal.win_price = self.win_price;
        signal.stop_loss_percent = self.stop_loss_percent;
        signal.stop_loss = self.stop_loss;
        signal.validate()?;
        Ok(signal)
    }
}

/// Validate `request`, assign the next free id and save it as pending.
pub fn register(
    store: &dyn SignalStore,
    config: &EvaluatorConfig,
    request: NewSignal,
) -> Result<Signal, IntakeError> {
    let id = next_id_after(&store.all()?);
    let signal = request.into_signal(id, config)?;
    store.save(&signal)?;
    info!(signal = %signal.id, market = %signal.market, quote_amount = signal.quote_amount, "signal registered");
    Ok(signal)
}

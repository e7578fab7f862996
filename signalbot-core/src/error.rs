use thiserror::Error;

use crate::config::EvaluatorConfigError;
use crate::domain::{OrderSide, SignalId, SignalStatus, TransitionError};
use crate::store::StoreError;
use crate::venue::{OrderApiError, PriceError};

/// Errors that end one signal's cycle. None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// No usable price; retried on the next tick.
    #[error("price unavailable for {market}: {source}")]
    PriceUnavailable {
        market: String,
        #[source]
        source: PriceError,
    },

    /// The venue refused or garbled an order request; retried on the next tick.
    #[error("order API error on signal {signal}: {source}")]
    OrderApi {
        signal: SignalId,
        #[source]
        source: OrderApiError,
    },

    #[error("buy refused for signal {signal}: price {price:.8} is at or below stop-loss {stop_loss:.8}")]
    StopLossGuard {
        signal: SignalId,
        price: f64,
        stop_loss: f64,
    },

    /// The status says an order exists but no execution record names it.
    #[error("signal {signal} is {status} but has no recorded {side} execution")]
    MissingExecution {
        signal: SignalId,
        status: SignalStatus,
        side: OrderSide,
    },

    #[error("balance query failed: {0}")]
    BalanceApi(#[source] OrderApiError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid evaluator config: {0}")]
    Config(#[from] EvaluatorConfigError),
}

impl EvaluatorError {
    /// Whether the next tick may succeed without anyone intervening.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EvaluatorError::PriceUnavailable { .. }
                | EvaluatorError::OrderApi { .. }
                | EvaluatorError::StopLossGuard { .. }
                | EvaluatorError::BalanceApi(_)
                | EvaluatorError::Store(_)
        )
    }
}

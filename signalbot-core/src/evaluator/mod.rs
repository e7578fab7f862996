//! The signal evaluator: one cycle of price refresh, decision and order action.
//!
//! A cycle runs synchronously to completion:
//! price fetch → level computation → extreme tracking → at most one order
//! action → persistence → notification. Callers guarantee that a given signal
//! is never evaluated concurrently.

mod orders;
mod report;

pub use report::{BalanceReport, StatusReport};

use tracing::{debug, info, info_span, warn};

use crate::config::EvaluatorConfig;
use crate::domain::{OrderSide, Signal, SignalEvent, SignalStatus};
use crate::error::EvaluatorError;
use crate::notify::Notifier;
use crate::pricing::PriceLevels;
use crate::store::SignalStore;
use crate::venue::{usable_price, OrderApiError, OrderExecutor, PriceSource};

/// Why a held position was sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellReason {
    Target,
    StopLoss,
}

/// What a `process` call did beyond refreshing prices.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Prices refreshed; the status has nothing to act on.
    Refreshed,
    /// Held, neither target nor stop-loss reached.
    Holding(PriceLevels),
    /// A sell was placed; `status` is where the signal ended up.
    Sold {
        reason: SellReason,
        status: SignalStatus,
    },
    /// The outstanding order is still open on the venue.
    OrderOpen,
    OrderCancelled,
    /// The outstanding order completed on the given side.
    OrderFilled(OrderSide),
}

/// Drives signals through their lifecycle against injected collaborators.
pub struct SignalEvaluator<'a> {
    config: EvaluatorConfig,
    prices: &'a dyn PriceSource,
    orders: &'a dyn OrderExecutor,
    notifier: &'a dyn Notifier,
    store: &'a dyn SignalStore,
}

impl<'a> SignalEvaluator<'a> {
    pub fn new(
        config: EvaluatorConfig,
        prices: &'a dyn PriceSource,
        orders: &'a dyn OrderExecutor,
        notifier: &'a dyn Notifier,
        store: &'a dyn SignalStore,
    ) -> Result<Self, EvaluatorError> {
        config.validate()?;
        Ok(Self {
            config,
            prices,
            orders,
            notifier,
            store,
        })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Run one cycle for `signal`.
    ///
    /// A price failure notifies once and leaves the signal untouched.
    pub fn process(&self, signal: &mut Signal) -> Result<CycleOutcome, EvaluatorError> {
        let span = info_span!("signal", id = %signal.id, market = %signal.market);
        let _guard = span.enter();

        let price = self.fetch_price(signal)?;
        let levels = PriceLevels::compute(signal, price);
        self.log_levels(signal, &levels);

        signal.observe_price(price);
        self.store.save(signal)?;

        match signal.status {
            SignalStatus::Held => {
                if levels.target_reached() {
                    info!("Profit!");
                    let status = self.sell(signal, price)?;
                    return Ok(CycleOutcome::Sold {
                        reason: SellReason::Target,
                        status,
                    });
                }
                if levels.stop_loss_reached() {
                    info!("Stop loss reached!");
                    let status = self.sell(signal, price)?;
                    return Ok(CycleOutcome::Sold {
                        reason: SellReason::StopLoss,
                        status,
                    });
                }
                Ok(CycleOutcome::Holding(levels))
            }
            SignalStatus::BuyOrderOpen | SignalStatus::SellOrderOpen => {
                self.poll_open_order(signal)
            }
            SignalStatus::PendingBuy | SignalStatus::Closed | SignalStatus::Cancelled => {
                Ok(CycleOutcome::Refreshed)
            }
        }
    }

    /// Last usable price for the signal's market; notifies on failure.
    pub fn fetch_price(&self, signal: &Signal) -> Result<f64, EvaluatorError> {
        usable_price(self.prices, &signal.market).map_err(|source| {
            warn!(market = %signal.market, %source, "price unavailable");
            self.notify(signal.chat_id, &format!("{}: price error!", signal.market));
            EvaluatorError::PriceUnavailable {
                market: signal.market.clone(),
                source,
            }
        })
    }

    fn poll_open_order(&self, signal: &mut Signal) -> Result<CycleOutcome, EvaluatorError> {
        let (side, execution) = match signal.status {
            SignalStatus::BuyOrderOpen => (OrderSide::Buy, signal.buy.as_ref()),
            _ => (OrderSide::Sell, signal.sell.as_ref()),
        };
        let Some(order_id) = execution.map(|e| e.order_id.clone()) else {
            let err = EvaluatorError::MissingExecution {
                signal: signal.id,
                status: signal.status,
                side,
            };
            return Err(self.inconsistency(signal, err));
        };

        let snapshot = self
            .orders
            .order(&order_id)
            .map_err(|source| self.order_api_failure(signal, source))?;
        debug!(order = %order_id, ?snapshot, "order status");

        if snapshot.is_open {
            return Ok(CycleOutcome::OrderOpen);
        }

        if snapshot.cancel_initiated {
            let next = signal
                .status
                .apply(SignalEvent::OrderCancelled)
                .map_err(|err| self.inconsistency(signal, err.into()))?;
            signal.status = next;
            self.store.save(signal)?;
            self.notify(signal.chat_id, &format!("{} order cancelled!", signal.coin));
            return Ok(CycleOutcome::OrderCancelled);
        }

        let event = match snapshot.side {
            OrderSide::Buy => SignalEvent::BuyFilled,
            OrderSide::Sell => SignalEvent::SellFilled,
        };
        let next = signal
            .status
            .apply(event)
            .map_err(|err| self.inconsistency(signal, err.into()))?;
        signal.status = next;
        self.store.save(signal)?;
        self.notify(
            signal.chat_id,
            &format!("{} {} order processed!", signal.coin, snapshot.side),
        );
        Ok(CycleOutcome::OrderFilled(snapshot.side))
    }

    fn log_levels(&self, signal: &Signal, levels: &PriceLevels) {
        info!(
            "Current: {} | Bought: {} | Target: {} | Stoploss: {:.8} | Profit: {} {} ({} %)",
            fmt_price(Some(levels.current)),
            fmt_price(signal.buy_price()),
            fmt_price(levels.target),
            levels.stop_loss,
            fmt_price(levels.profit_quote),
            self.config.quote_currency,
            fmt_pct(levels.profit_percent),
        );
    }

    /// Quote/USD rate, or `None` if the source cannot provide it right now.
    fn usd_rate(&self) -> Option<f64> {
        match self.prices.quote_usd_rate() {
            Ok(rate) => Some(rate),
            Err(err) => {
                debug!(%err, "USD rate unavailable, omitting USD figures");
                None
            }
        }
    }

    fn order_api_failure(&self, signal: &Signal, source: OrderApiError) -> EvaluatorError {
        warn!(signal = %signal.id, %source, "order API error");
        self.notify(
            signal.chat_id,
            &format!("{} ({}): API Error: {}", signal.id, signal.coin, source),
        );
        EvaluatorError::OrderApi {
            signal: signal.id,
            source,
        }
    }

    /// A signal whose records contradict its status or its venue order.
    fn inconsistency(&self, signal: &Signal, err: EvaluatorError) -> EvaluatorError {
        warn!(signal = %signal.id, %err, "inconsistent signal");
        self.notify(
            signal.chat_id,
            &format!("{} ({}): {}", signal.id, signal.coin, err),
        );
        err
    }

    /// Best-effort delivery; a failing sink is logged and otherwise ignored.
    fn notify(&self, chat_id: i64, text: &str) {
        debug!(chat_id, text, "notify");
        if let Err(err) = self.notifier.send(chat_id, text) {
            warn!(chat_id, %err, text, "notification failed");
        }
    }
}

pub(crate) fn fmt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.8}"))
}

pub(crate) fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub(crate) fn fmt_usd(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

//! Buy and sell actions.

use chrono::Utc;
use tracing::{info, warn};

use super::{fmt_usd, SignalEvaluator};
use crate::domain::{Execution, OrderId, OrderSide, Placement, Signal, SignalEvent, SignalStatus};
use crate::error::EvaluatorError;
use crate::pricing::{
    adjusted_sell_price, profit_percent, profit_quote, stop_loss_hit, stop_loss_price,
};
use crate::venue::OrderApiError;

/// What gets written into an execution record, and the event it implies.
struct Recorded {
    order_id: OrderId,
    quantity: f64,
    price: f64,
    commission: f64,
    event: SignalEvent,
}

impl SignalEvaluator<'_> {
    /// Buy `quote_amount / current_price` units at `current_price`.
    ///
    /// Refused when the price already sits at or below the stop-loss, which for
    /// a signal without a buy price is computed from `current_price` itself.
    pub fn buy(
        &self,
        signal: &mut Signal,
        current_price: f64,
    ) -> Result<SignalStatus, EvaluatorError> {
        signal
            .status
            .apply(SignalEvent::BuyPlaced)
            .map_err(|err| self.inconsistency(signal, err.into()))?;

        let stop_loss = stop_loss_price(signal, current_price);
        if stop_loss_hit(stop_loss, current_price) {
            self.notify(
                signal.chat_id,
                &format!("Can't buy, stop loss reached ({current_price:.8})"),
            );
            return Err(EvaluatorError::StopLossGuard {
                signal: signal.id,
                price: current_price,
                stop_loss,
            });
        }

        let quantity = signal.quote_amount / current_price;
        let placement = self
            .orders
            .place_buy_limit(&signal.market, quantity, current_price)
            .and_then(require_order_id)
            .map_err(|source| self.order_api_failure(signal, source))?;

        let recorded = match placement {
            Placement::Filled(fill) => Recorded {
                order_id: fill.order_id,
                quantity: fill.quantity,
                price: fill.price,
                commission: fill.commission,
                event: SignalEvent::BuyFilled,
            },
            Placement::Open(order_id) => {
                let (quantity, price, commission) =
                    self.read_back(&order_id, quantity, current_price);
                Recorded {
                    order_id,
                    quantity,
                    price,
                    commission,
                    event: SignalEvent::BuyPlaced,
                }
            }
        };
        let next = signal.status.apply(recorded.event)?;

        signal.quantity = recorded.quantity;
        signal.buy = Some(Execution {
            price: recorded.price,
            order_id: recorded.order_id,
            commission: recorded.commission,
            executed_at: Utc::now(),
        });
        signal.status = next;
        self.store.save(signal)?;

        let usd = self.usd_rate().map(|rate| rate * signal.quote_amount);
        self.notify(
            signal.chat_id,
            &format!(
                "Buy order placed: {} {} at {:.8} for {} {} ({} USD)",
                signal.quantity,
                signal.coin,
                recorded.price,
                signal.quote_amount,
                self.config.quote_currency,
                fmt_usd(usd),
            ),
        );
        Ok(next)
    }

    /// Sell the full recorded quantity slightly under `current_price`.
    ///
    /// Records the sell execution and the realized profit.
    pub fn sell(
        &self,
        signal: &mut Signal,
        current_price: f64,
    ) -> Result<SignalStatus, EvaluatorError> {
        signal
            .status
            .apply(SignalEvent::SellPlaced)
            .map_err(|err| self.inconsistency(signal, err.into()))?;
        let Some(bought) = signal.buy_price() else {
            let err = EvaluatorError::MissingExecution {
                signal: signal.id,
                status: signal.status,
                side: OrderSide::Buy,
            };
            return Err(self.inconsistency(signal, err));
        };

        let sell_price = adjusted_sell_price(current_price, self.config.safe_order_pct);
        info!("Adjusted sell price: {sell_price:.8}");

        let placement = self
            .orders
            .place_sell_limit(&signal.market, signal.quantity, sell_price)
            .and_then(require_order_id)
            .map_err(|source| {
                let err = self.order_api_failure(signal, source);
                self.notify(
                    signal.chat_id,
                    &format!(
                        "Quantity: {:.8} | Price: {:.8}",
                        signal.quantity, sell_price
                    ),
                );
                err
            })?;

        let recorded = match placement {
            Placement::Filled(fill) => Recorded {
                order_id: fill.order_id,
                quantity: fill.quantity,
                price: fill.price,
                commission: fill.commission,
                event: SignalEvent::SellFilled,
            },
            Placement::Open(order_id) => {
                let (quantity, price, commission) =
                    self.read_back(&order_id, signal.quantity, sell_price);
                Recorded {
                    order_id,
                    quantity,
                    price,
                    commission,
                    event: SignalEvent::SellPlaced,
                }
            }
        };
        let next = signal.status.apply(recorded.event)?;

        signal.sell = Some(Execution {
            price: recorded.price,
            order_id: recorded.order_id,
            commission: round_8(recorded.commission),
            executed_at: Utc::now(),
        });
        signal.status = next;
        let profit = profit_quote(bought, recorded.price, signal.quantity);
        let profit_pct = profit_percent(bought, recorded.price);
        signal.profit_quote = Some(profit);
        signal.profit_percent = Some(profit_pct);
        self.store.save(signal)?;

        let notional = recorded.price * signal.quantity;
        let usd = self.usd_rate().map(|rate| rate * profit);
        self.notify(
            signal.chat_id,
            &format!(
                "Sell order placed: {} {} at {:.8} for {:.8} {} \n({:.2} % profit! | {:.8} {} | {} USD)",
                signal.quantity,
                signal.coin,
                recorded.price,
                notional,
                self.config.quote_currency,
                profit_pct,
                profit,
                self.config.quote_currency,
                fmt_usd(usd),
            ),
        );
        Ok(next)
    }

    /// Quantity, limit price and commission of a freshly placed order.
    ///
    /// If the lookup fails the order id is still worth recording, so fall back
    /// to what was requested.
    fn read_back(&self, order_id: &OrderId, quantity: f64, price: f64) -> (f64, f64, f64) {
        match self.orders.order(order_id) {
            Ok(snapshot) => (snapshot.quantity, snapshot.limit_price, snapshot.commission_paid),
            Err(err) => {
                warn!(order = %order_id, %err, "order lookup after placement failed, recording requested values");
                (quantity, price, 0.0)
            }
        }
    }
}

fn require_order_id(placement: Placement) -> Result<Placement, OrderApiError> {
    let id = match &placement {
        Placement::Open(id) => id,
        Placement::Filled(fill) => &fill.order_id,
    };
    if id.is_blank() {
        return Err(OrderApiError::MissingOrderId {
            response: format!("{placement:?}"),
        });
    }
    Ok(placement)
}

fn round_8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

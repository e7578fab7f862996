//! Price levels and profit metrics derived from a signal and a market price.
//!
//! The percentage forms are written as `base ± pct * base / 100` so that round
//! inputs (e.g. 100 and 10%) produce exact results.

use serde::{Deserialize, Serialize};

use crate::domain::{Signal, Threshold};

/// Target price, or `None` when the signal can never profit-sell.
///
/// A percentage target needs a recorded buy price.
pub fn target_price(signal: &Signal) -> Option<f64> {
    match signal.target_rule()? {
        Threshold::Percent(pct) => {
            let bought = signal.buy_price()?;
            Some(bought + pct * bought / 100.0)
        }
        Threshold::Absolute(price) => Some(price),
    }
}

/// Stop-loss price; `0.0` means disabled.
///
/// The base is the buy price when recorded, else `current_price`. Before a buy
/// this makes a percentage stop relative to the quote being bought at.
pub fn stop_loss_price(signal: &Signal, current_price: f64) -> f64 {
    let base = signal.buy_price().unwrap_or(current_price);
    match signal.stop_loss_rule() {
        Some(Threshold::Percent(pct)) => base - pct * base / 100.0,
        Some(Threshold::Absolute(price)) => price,
        None => 0.0,
    }
}

/// Whether `price` is at or below an enabled stop-loss.
pub fn stop_loss_hit(stop_loss: f64, price: f64) -> bool {
    stop_loss > 0.0 && price <= stop_loss
}

/// Sell limit shaved by `safe_order_pct` so it fills quickly.
pub fn adjusted_sell_price(current_price: f64, safe_order_pct: f64) -> f64 {
    current_price - safe_order_pct * current_price / 100.0
}

/// Profit in quote currency for selling `quantity` at `sell_price`.
pub fn profit_quote(buy_price: f64, sell_price: f64, quantity: f64) -> f64 {
    (sell_price - buy_price) * quantity
}

/// Profit percent measured against the midpoint of buy and sell prices.
///
/// Symmetric: swapping buy and sell flips the sign and keeps the magnitude.
/// This is not `(sell - buy) / buy * 100`.
pub fn profit_percent(buy_price: f64, sell_price: f64) -> f64 {
    let mid = (buy_price + sell_price) / 2.0;
    let raw = (buy_price - sell_price) / mid * 100.0;
    if buy_price > sell_price {
        -raw.abs()
    } else {
        raw.abs()
    }
}

/// Everything the evaluator derives for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub current: f64,
    pub target: Option<f64>,
    pub stop_loss: f64,
    /// `None` until a buy price is recorded.
    pub profit_quote: Option<f64>,
    pub profit_percent: Option<f64>,
}

impl PriceLevels {
    pub fn compute(signal: &Signal, current_price: f64) -> Self {
        let bought = signal.buy_price();
        Self {
            current: current_price,
            target: target_price(signal),
            stop_loss: stop_loss_price(signal, current_price),
            profit_quote: bought.map(|b| profit_quote(b, current_price, signal.quantity)),
            profit_percent: bought.map(|b| profit_percent(b, current_price)),
        }
    }

    pub fn target_reached(&self) -> bool {
        self.target.is_some_and(|target| self.current >= target)
    }

    pub fn stop_loss_reached(&self) -> bool {
        stop_loss_hit(self.stop_loss, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Execution, OrderId, SignalId};
    use chrono::Utc;

    fn held(buy_price: f64, quantity: f64) -> Signal {
        let mut s = Signal::new(SignalId(1), "BTC-ETH", "ETH", 0.01, 1);
        s.quantity = quantity;
        s.buy = Some(Execution {
            price: buy_price,
            order_id: OrderId::demo(),
            commission: 0.0,
            executed_at: Utc::now(),
        });
        s
    }

    #[test]
    fn percent_target() {
        let mut s = held(100.0, 2.0);
        s.win_percent = Some(10.0);
        assert_eq!(target_price(&s), Some(110.0));
    }

    #[test]
    fn absolute_target_is_literal() {
        let mut s = held(100.0, 2.0);
        s.win_price = Some(123.456);
        assert_eq!(target_price(&s), Some(123.456));
    }

    #[test]
    fn percent_target_without_buy_price_is_none() {
        let mut s = Signal::new(SignalId(1), "BTC-ETH", "ETH", 0.01, 1);
        s.win_percent = Some(10.0);
        assert_eq!(target_price(&s), None);
    }

    #[test]
    fn stop_loss_uses_buy_price_as_base() {
        let mut s = held(100.0, 1.0);
        s.stop_loss_percent = Some(5.0);
        assert_eq!(stop_loss_price(&s, 80.0), 95.0);
    }

    #[test]
    fn stop_loss_falls_back_to_current_price() {
        let mut s = Signal::new(SignalId(1), "BTC-ETH", "ETH", 0.01, 1);
        s.stop_loss_percent = Some(10.0);
        assert_eq!(stop_loss_price(&s, 200.0), 180.0);
    }

    #[test]
    fn absent_stop_loss_is_disabled() {
        let s = held(100.0, 1.0);
        assert_eq!(stop_loss_price(&s, 1.0), 0.0);
        assert!(!stop_loss_hit(0.0, 0.000_000_01));
    }

    #[test]
    fn adjusted_sell_price_shaves_percent() {
        assert_eq!(adjusted_sell_price(200.0, 0.5), 199.0);
        assert_eq!(adjusted_sell_price(115.0, 0.0), 115.0);
    }

    #[test]
    fn profit_percent_is_midpoint_based() {
        // (110 - 100) / 105 * 100, not 10%.
        let pct = profit_percent(100.0, 110.0);
        assert!((pct - 9.523_809_523_809_524).abs() < 1e-12);
        assert!((profit_percent(110.0, 100.0) + pct).abs() < 1e-12);
        assert_eq!(profit_percent(100.0, 100.0), 0.0);
    }

    #[test]
    fn levels_for_held_signal() {
        let mut s = held(100.0, 2.0);
        s.win_percent = Some(10.0);
        s.stop_loss_percent = Some(5.0);

        let levels = PriceLevels::compute(&s, 115.0);
        assert_eq!(levels.target, Some(110.0));
        assert_eq!(levels.stop_loss, 95.0);
        assert_eq!(levels.profit_quote, Some(30.0));
        assert!(levels.target_reached());
        assert!(!levels.stop_loss_reached());

        let levels = PriceLevels::compute(&s, 94.0);
        assert!(!levels.target_reached());
        assert!(levels.stop_loss_reached());
    }

    #[test]
    fn levels_before_buy_have_no_profit() {
        let s = Signal::new(SignalId(1), "BTC-ETH", "ETH", 0.01, 1);
        let levels = PriceLevels::compute(&s, 0.05);
        assert_eq!(levels.profit_quote, None);
        assert_eq!(levels.profit_percent, None);
        assert!(!levels.target_reached());
    }
}

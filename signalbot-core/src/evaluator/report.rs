//! Read-only snapshots sent on request: signal status and account balances.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{fmt_pct, fmt_price, fmt_usd, SignalEvaluator};
use crate::domain::{Signal, SignalStatus};
use crate::error::EvaluatorError;
use crate::pricing::PriceLevels;
use crate::venue::{usable_price, OrderApiError};

/// Snapshot of one signal at the current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub coin: String,
    pub status: SignalStatus,
    pub quote_currency: String,
    pub current: f64,
    pub bought: Option<f64>,
    pub target: Option<f64>,
    pub stop_loss: f64,
    pub profit_quote: Option<f64>,
    pub profit_percent: Option<f64>,
    pub profit_usd: Option<f64>,
    /// Held quantity valued at the current price, in quote currency.
    pub notional_quote: f64,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: ", self.coin)?;
        writeln!(f, "Current: {:.8} ", self.current)?;
        writeln!(f, "Bought: {} ", fmt_price(self.bought))?;
        writeln!(f, "Target: {} ", fmt_price(self.target))?;
        writeln!(f, "Stoploss: {:.8} ", self.stop_loss)?;
        writeln!(
            f,
            "Value: {:.8} {} ",
            self.notional_quote, self.quote_currency
        )?;
        write!(
            f,
            "Profit: {} {} ({} % | {} USD)",
            fmt_price(self.profit_quote),
            self.quote_currency,
            fmt_pct(self.profit_percent),
            fmt_usd(self.profit_usd)
        )
    }
}

/// Quote-currency holdings and total account value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub quote_currency: String,
    pub available_quote: f64,
    /// Available quote plus every other balance valued at its last price.
    pub total_quote: f64,
    pub total_usd: Option<f64>,
    /// Currencies left out of the total because no price was available.
    pub unpriced: Vec<String>,
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Available {}s: {:.8}",
            self.quote_currency, self.available_quote
        )?;
        writeln!(f, "Total {}s: {:.8}", self.quote_currency, self.total_quote)?;
        match self.total_usd {
            Some(usd) => write!(f, "Total USD: {}", usd.trunc() as i64),
            None => write!(f, "Total USD: n/a"),
        }
    }
}

impl SignalEvaluator<'_> {
    /// Send and return a status snapshot. Does not modify or save the signal.
    pub fn report_status(&self, signal: &Signal) -> Result<StatusReport, EvaluatorError> {
        let price = self.fetch_price(signal)?;
        let levels = PriceLevels::compute(signal, price);
        let usd_rate = self.usd_rate();

        let report = StatusReport {
            coin: signal.coin.clone(),
            status: signal.status,
            quote_currency: self.config.quote_currency.clone(),
            current: price,
            bought: signal.buy_price(),
            target: levels.target,
            stop_loss: levels.stop_loss,
            profit_quote: levels.profit_quote,
            profit_percent: levels.profit_percent,
            profit_usd: levels.profit_quote.zip(usd_rate).map(|(p, r)| p * r),
            notional_quote: signal.quantity * price,
        };
        self.notify(signal.chat_id, &report.to_string());
        Ok(report)
    }

    /// Send and return the account's balances to `chat_id`.
    ///
    /// Non-quote balances are valued through the `QUOTE-COIN` market; ones
    /// without a usable price are skipped.
    pub fn report_balances(&self, chat_id: i64) -> Result<BalanceReport, EvaluatorError> {
        let quote = self.config.quote_currency.clone();
        let available_quote = self
            .orders
            .balance(&quote)
            .map_err(|source| self.balance_failure(chat_id, source))?
            .available;
        let balances = self
            .orders
            .balances()
            .map_err(|source| self.balance_failure(chat_id, source))?;

        let mut total_quote = available_quote;
        let mut unpriced = Vec::new();
        for balance in balances {
            if balance.available <= 0.0 || balance.currency == quote {
                continue;
            }
            let market = self.config.market_for(&balance.currency);
            match usable_price(self.prices, &market) {
                Ok(price) => total_quote += balance.available * price,
                Err(err) => {
                    debug!(%market, %err, "no price, left out of total");
                    unpriced.push(balance.currency);
                }
            }
        }

        let report = BalanceReport {
            quote_currency: quote,
            available_quote,
            total_quote,
            total_usd: self.usd_rate().map(|rate| rate * total_quote),
            unpriced,
        };
        self.notify(chat_id, &report.to_string());
        Ok(report)
    }

    fn balance_failure(&self, chat_id: i64, source: OrderApiError) -> EvaluatorError {
        self.notify(chat_id, &format!("Balance API Error: {source}"));
        EvaluatorError::BalanceApi(source)
    }
}

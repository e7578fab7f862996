//! Trade tape export for closed signals.

use std::path::Path;

use anyhow::{Context, Result};

use signalbot_core::domain::{Signal, SignalStatus};

/// CSV of every closed signal with both execution records.
///
/// Columns: id, market, coin, quantity, buy_price, buy_order_id, bought_at,
/// sell_price, sell_order_id, sold_at, commission, profit_quote, profit_percent
pub fn export_closed_csv(signals: &[Signal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "market",
        "coin",
        "quantity",
        "buy_price",
        "buy_order_id",
        "bought_at",
        "sell_price",
        "sell_order_id",
        "sold_at",
        "commission",
        "profit_quote",
        "profit_percent",
    ])?;

    for s in signals.iter().filter(|s| s.status == SignalStatus::Closed) {
        let (Some(buy), Some(sell)) = (&s.buy, &s.sell) else {
            continue;
        };
        wtr.write_record([
            &s.id.to_string(),
            &s.market,
            &s.coin,
            &format!("{:.8}", s.quantity),
            &format!("{:.8}", buy.price),
            &buy.order_id.to_string(),
            &buy.executed_at.to_rfc3339(),
            &format!("{:.8}", sell.price),
            &sell.order_id.to_string(),
            &sell.executed_at.to_rfc3339(),
            &format!("{:.8}", buy.commission + sell.commission),
            &s.profit_quote.map(|p| format!("{p:.8}")).unwrap_or_default(),
            &s.profit_percent.map(|p| format!("{p:.2}")).unwrap_or_default(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write [`export_closed_csv`] output to `path`.
pub fn write_closed_csv(path: &Path, signals: &[Signal]) -> Result<()> {
    let csv = export_closed_csv(signals)?;
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write trade tape {}", path.display()))
}

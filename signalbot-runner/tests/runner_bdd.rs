//! BDD tests for the runner: a signal's whole life through config, file
//! store, quotes file, ticks and export.

use std::fs;
use std::path::Path;

use signalbot_core::domain::{SignalId, SignalStatus};
use signalbot_core::notify::TracingNotifier;
use signalbot_core::store::SignalStore;
use signalbot_core::venue::QuoteBoard;
use signalbot_runner::{
    export_closed_csv, register, run_tick, save_quotes, Bot, BotConfig, NewSignal, TickSummary,
};

const CONFIG: &str = r#"
[trading]
quote_currency = "BTC"
safe_order_pct = 0.5
auto_buy = true

[store]
path = "signals.json"

[quotes]
path = "quotes.toml"

[[paper.balances]]
currency = "BTC"
available = 1.0
"#;

fn write_config(dir: &Path, content: &str) -> BotConfig {
    let path = dir.join("signalbot.toml");
    fs::write(&path, content).unwrap();
    BotConfig::from_file(&path).unwrap()
}

fn set_quotes(dir: &Path, board: &QuoteBoard) {
    save_quotes(&dir.join("quotes.toml"), board).unwrap();
}

fn tick(config: &BotConfig) -> TickSummary {
    let bot = Bot::from_config(config.clone()).unwrap();
    let notifier = TracingNotifier;
    let evaluator = bot.evaluator(&notifier).unwrap();
    run_tick(&evaluator, &bot.store, bot.config.trading.auto_buy).unwrap()
}

fn eth_signal() -> NewSignal {
    NewSignal {
        coin: "ETH".into(),
        quote_amount: 0.01,
        win_percent: Some(10.0),
        stop_loss_percent: Some(5.0),
        chat_id: 42,
        ..NewSignal::default()
    }
}

#[test]
fn bdd_scenario_signal_is_bought_then_sold_at_target() {
    // GIVEN a simulated bot with auto-buy and a registered ETH signal
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), CONFIG);
    set_quotes(
        dir.path(),
        &QuoteBoard::new().with_price("BTC-ETH", 0.05).with_usd_rate(20_000.0),
    );
    let bot = Bot::from_config(config.clone()).unwrap();
    let signal = register(&bot.store, &config.trading.evaluator, eth_signal()).unwrap();
    assert_eq!(signal.id, SignalId(1));

    // WHEN the first tick runs
    let summary = tick(&config);

    // THEN the signal is bought and held with a simulated fill
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.bought, 1);
    let held = bot.store.load(SignalId(1)).unwrap();
    assert_eq!(held.status, SignalStatus::Held);
    assert!((held.quantity - 0.2).abs() < 1e-9);
    assert!(held.buy.as_ref().unwrap().order_id.is_demo());

    // WHEN the price moves but stays between stop loss and target
    set_quotes(
        dir.path(),
        &QuoteBoard::new().with_price("BTC-ETH", 0.052).with_usd_rate(20_000.0),
    );
    let summary = tick(&config);

    // THEN the position is kept and counted as holding
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.holding, 1);
    assert_eq!(summary.sold, 0);
    assert_eq!(bot.store.load(SignalId(1)).unwrap().status, SignalStatus::Held);

    // WHEN the price climbs past the 10% target and another tick runs
    set_quotes(
        dir.path(),
        &QuoteBoard::new().with_price("BTC-ETH", 0.06).with_usd_rate(20_000.0),
    );
    let summary = tick(&config);

    // THEN the position is sold and the signal closed with a profit
    assert_eq!(summary.sold, 1);
    let closed = bot.store.load(SignalId(1)).unwrap();
    assert_eq!(closed.status, SignalStatus::Closed);
    assert!(closed.profit_quote.unwrap() > 0.0);
    assert_eq!(closed.highest_price, Some(0.06));
    assert_eq!(closed.lowest_price, Some(0.05));

    // AND later ticks skip it
    assert_eq!(tick(&config).processed, 0);

    // AND it shows up in the trade tape
    let csv = export_closed_csv(&bot.store.all().unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.lines().nth(1).unwrap().starts_with("1,BTC-ETH,ETH,"));
}

#[test]
fn bdd_scenario_missing_price_fails_one_signal_only() {
    // GIVEN two signals, one on a market without a quote
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), CONFIG);
    set_quotes(dir.path(), &QuoteBoard::new().with_price("BTC-ETH", 0.05));
    let bot = Bot::from_config(config.clone()).unwrap();
    register(&bot.store, &config.trading.evaluator, eth_signal()).unwrap();
    register(
        &bot.store,
        &config.trading.evaluator,
        NewSignal {
            coin: "XYZ".into(),
            ..eth_signal()
        },
    )
    .unwrap();

    // WHEN a tick runs
    let summary = tick(&config);

    // THEN the priced signal is bought and the other is counted as failed
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.bought, 1);
    assert_eq!(summary.failed, 1);

    // AND the unpriced signal is left exactly as registered
    let untouched = bot.store.load(SignalId(2)).unwrap();
    assert_eq!(untouched.status, SignalStatus::PendingBuy);
    assert_eq!(untouched.current_price, None);
}

#[test]
fn bdd_scenario_without_auto_buy_pending_signals_only_track_prices() {
    // GIVEN a bot with auto-buy off
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &CONFIG.replace("auto_buy = true", "auto_buy = false"));
    set_quotes(dir.path(), &QuoteBoard::new().with_price("BTC-ETH", 0.05));
    let bot = Bot::from_config(config.clone()).unwrap();
    register(&bot.store, &config.trading.evaluator, eth_signal()).unwrap();

    // WHEN a tick runs
    let summary = tick(&config);

    // THEN nothing is bought but the price is recorded
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.bought, 0);
    assert!(bot.executor.orders().is_empty());
    let pending = bot.store.load(SignalId(1)).unwrap();
    assert_eq!(pending.status, SignalStatus::PendingBuy);
    assert_eq!(pending.current_price, Some(0.05));
}

#[test]
fn bdd_scenario_live_mode_cannot_start() {
    // GIVEN a config asking for live trading
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &CONFIG.replace("auto_buy = true", "auto_buy = true\nmode = \"live\""),
    );

    // WHEN the bot is assembled
    // THEN it refuses, since no exchange adapter is available
    assert!(Bot::from_config(config).is_err());
}

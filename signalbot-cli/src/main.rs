//! SignalBot CLI: signal intake, ticks, reports and export.
//!
//! Commands:
//! - `add`: register a new signal
//! - `tick`: run one evaluation cycle over every live signal (optionally in a loop)
//! - `buy`: place the buy for a pending signal now
//! - `status`: price snapshot of one signal
//! - `balances`: account balances valued in quote currency and USD
//! - `list`: all stored signals
//! - `quote`: set a price in the quotes file used by simulated runs
//! - `export`: CSV trade tape of closed signals

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use signalbot_core::domain::SignalId;
use signalbot_core::notify::{StdoutNotifier, TracingNotifier};
use signalbot_core::store::SignalStore;
use signalbot_runner::{
    load_quotes, register, run_tick, save_quotes, write_closed_csv, Bot, BotConfig, NewSignal,
};

#[derive(Parser)]
#[command(name = "signalbot", about = "SignalBot CLI: trade signals to completion")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "signalbot.toml")]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new signal in the PENDING_BUY state.
    Add {
        /// Coin to buy, e.g. ETH.
        coin: String,

        /// Quote-currency amount to spend.
        amount: f64,

        /// Market identifier. Defaults to QUOTE-COIN.
        #[arg(long)]
        market: Option<String>,

        /// Take profit this many percent above the buy price.
        #[arg(long)]
        win_percent: Option<f64>,

        /// Take profit at this absolute price.
        #[arg(long)]
        win_price: Option<f64>,

        /// Stop out this many percent below the buy price.
        #[arg(long)]
        stop_loss_percent: Option<f64>,

        /// Stop out at this absolute price.
        #[arg(long)]
        stop_loss: Option<f64>,

        /// Chat that receives this signal's notifications.
        #[arg(long, default_value_t = 0)]
        chat_id: i64,
    },
    /// Evaluate every live signal once.
    Tick {
        /// Keep ticking, sleeping this many seconds between ticks.
        #[arg(long)]
        every: Option<u64>,
    },
    /// Buy a pending signal at the current price.
    Buy { id: u64 },
    /// Show a signal's current levels and profit.
    Status { id: u64 },
    /// Report account balances.
    Balances {
        #[arg(long, default_value_t = 0)]
        chat_id: i64,
    },
    /// List all stored signals.
    List,
    /// Set a market price (and optionally the USD rate) in the quotes file.
    Quote {
        market: String,
        price: f64,

        #[arg(long)]
        usd_rate: Option<f64>,
    },
    /// Write closed signals to a CSV file.
    Export {
        #[arg(default_value = "trades.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Add {
            coin,
            amount,
            market,
            win_percent,
            win_price,
            stop_loss_percent,
            stop_loss,
            chat_id,
        } => {
            if win_percent.is_some() && win_price.is_some() {
                bail!("--win-percent and --win-price are mutually exclusive");
            }
            if stop_loss_percent.is_some() && stop_loss.is_some() {
                bail!("--stop-loss-percent and --stop-loss are mutually exclusive");
            }
            let request = NewSignal {
                coin,
                market,
                quote_amount: amount,
                win_percent,
                win_price,
                stop_loss_percent,
                stop_loss,
                chat_id,
            };
            run_add(config, request)
        }
        Commands::Tick { every } => run_tick_cmd(&config, every),
        Commands::Buy { id } => run_buy(config, SignalId(id)),
        Commands::Status { id } => run_status(config, SignalId(id)),
        Commands::Balances { chat_id } => run_balances(config, chat_id),
        Commands::List => run_list(config),
        Commands::Quote {
            market,
            price,
            usd_rate,
        } => run_quote(&config, market, price, usd_rate),
        Commands::Export { output } => run_export(config, &output),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config not found, using defaults");
        return Ok(BotConfig::default());
    }
    BotConfig::from_file(path).with_context(|| format!("failed to load {}", path.display()))
}

fn run_add(config: BotConfig, request: NewSignal) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let signal = register(&bot.store, &bot.config.trading.evaluator, request)?;
    println!(
        "Signal {} registered: {} {} {}",
        signal.id, signal.market, signal.quote_amount, bot.config.trading.evaluator.quote_currency
    );
    Ok(())
}

fn run_tick_cmd(config: &BotConfig, every: Option<u64>) -> Result<()> {
    if every == Some(0) {
        bail!("--every must be at least 1 second");
    }
    loop {
        // Rebuilt each tick so edits to the quotes file are picked up.
        let bot = Bot::from_config(config.clone())?;
        let notifier = TracingNotifier;
        let evaluator = bot.evaluator(&notifier)?;
        let summary = run_tick(&evaluator, &bot.store, bot.config.trading.auto_buy)?;
        println!(
            "processed {} | bought {} | sold {} | filled {} | cancelled {} | holding {} | failed {}",
            summary.processed,
            summary.bought,
            summary.sold,
            summary.filled,
            summary.cancelled,
            summary.holding,
            summary.failed
        );

        match every {
            Some(secs) => std::thread::sleep(Duration::from_secs(secs)),
            None => return Ok(()),
        }
    }
}

fn run_buy(config: BotConfig, id: SignalId) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let notifier = StdoutNotifier;
    let evaluator = bot.evaluator(&notifier)?;
    let mut signal = bot.store.load(id)?;
    let price = evaluator.fetch_price(&signal)?;
    let status = evaluator.buy(&mut signal, price)?;
    info!(signal = %id, %status, "buy placed");
    Ok(())
}

fn run_status(config: BotConfig, id: SignalId) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let notifier = StdoutNotifier;
    let evaluator = bot.evaluator(&notifier)?;
    let signal = bot.store.load(id)?;
    evaluator.report_status(&signal)?;
    Ok(())
}

fn run_balances(config: BotConfig, chat_id: i64) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let notifier = StdoutNotifier;
    let evaluator = bot.evaluator(&notifier)?;
    evaluator.report_balances(chat_id)?;
    Ok(())
}

fn run_list(config: BotConfig) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let signals = bot.store.all()?;
    if signals.is_empty() {
        println!("No signals.");
        return Ok(());
    }
    println!(
        "{:>4}  {:<12} {:<16} {:>14} {:>14} {:>14} {:>9}",
        "id", "market", "status", "amount", "bought", "current", "profit %"
    );
    for s in &signals {
        println!(
            "{:>4}  {:<12} {:<16} {:>14.8} {:>14} {:>14} {:>9}",
            s.id,
            s.market,
            s.status.to_string(),
            s.quote_amount,
            s.buy_price().map_or("-".into(), |p| format!("{p:.8}")),
            s.current_price.map_or("-".into(), |p| format!("{p:.8}")),
            s.profit_percent.map_or("-".into(), |p| format!("{p:.2}")),
        );
    }
    Ok(())
}

fn run_quote(config: &BotConfig, market: String, price: f64, usd_rate: Option<f64>) -> Result<()> {
    if !(price.is_finite() && price > 0.0) {
        bail!("price must be a positive number, got {price}");
    }
    let path = &config.quotes.path;
    let mut board = load_quotes(path)?;
    board.set_price(market.to_uppercase(), price);
    if let Some(rate) = usd_rate {
        board.usd_rate = Some(rate);
    }
    save_quotes(path, &board)?;
    println!("{} = {price:.8} ({})", market.to_uppercase(), path.display());
    Ok(())
}

fn run_export(config: BotConfig, output: &Path) -> Result<()> {
    let bot = Bot::from_config(config)?;
    let signals = bot.store.all()?;
    write_closed_csv(output, &signals)?;
    println!("Trade tape written to {}", output.display());
    Ok(())
}

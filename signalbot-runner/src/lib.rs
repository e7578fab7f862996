//! SignalBot Runner: everything around the evaluator.
//!
//! - TOML configuration and collaborator assembly
//! - JSON file signal store
//! - Quotes file for simulated prices
//! - Signal intake with validation
//! - Tick orchestration across all live signals
//! - CSV export of closed trades

pub mod bot;
pub mod config;
pub mod export;
pub mod intake;
pub mod quotes;
pub mod store;
pub mod tick;

pub use bot::{Bot, BotError};
pub use config::{BotConfig, ConfigError, TradingMode};
pub use export::{export_closed_csv, write_closed_csv};
pub use intake::{register, IntakeError, NewSignal};
pub use quotes::{load_quotes, save_quotes, QuotesError};
pub use store::JsonSignalStore;
pub use tick::{run_tick, RunnerError, TickSummary};

//! SignalBot Core: signal domain, pricing rules, and the evaluator state machine.
//!
//! This crate contains everything that decides what happens to a signal:
//! - Domain types (signals, execution records, orders, balances)
//! - Lifecycle status enum with a single transition table
//! - Target / stop-loss / sell-price / profit formulas
//! - `SignalEvaluator`: one synchronous cycle per signal
//! - Collaborator traits (prices, orders, notifications, persistence)
//!   with in-memory and simulated implementations

pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod notify;
pub mod pricing;
pub mod store;
pub mod venue;

pub use config::{EvaluatorConfig, EvaluatorConfigError};
pub use error::EvaluatorError;
pub use evaluator::{BalanceReport, CycleOutcome, SellReason, SignalEvaluator, StatusReport};

//! One scheduler tick over every live signal.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use signalbot_core::domain::{Signal, SignalStatus};
use signalbot_core::store::{SignalStore, StoreError};
use signalbot_core::{CycleOutcome, EvaluatorError, SignalEvaluator};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to load signals: {0}")]
    Store(#[from] StoreError),
}

/// Counts of what happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Signals a cycle was attempted for.
    pub processed: usize,
    /// Pending signals bought during this tick.
    pub bought: usize,
    /// Held signals whose target or stop loss triggered a sell.
    pub sold: usize,
    /// Open venue orders found filled.
    pub filled: usize,
    /// Open venue orders found cancelled.
    pub cancelled: usize,
    /// Held signals still between stop loss and target.
    pub holding: usize,
    /// Signals whose cycle ended in an error.
    pub failed: usize,
}

impl TickSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Sold { .. } => self.sold += 1,
            CycleOutcome::OrderFilled(_) => self.filled += 1,
            CycleOutcome::OrderCancelled => self.cancelled += 1,
            CycleOutcome::Holding(_) => self.holding += 1,
            CycleOutcome::Refreshed | CycleOutcome::OrderOpen => {}
        }
    }
}

/// Run one evaluation cycle for every non-terminal signal in `store`.
///
/// Signals are processed one after another, so no signal is ever evaluated
/// twice at once. A failing signal is logged and counted; the rest still run.
/// With `auto_buy`, pending signals are bought at the price just fetched.
pub fn run_tick(
    evaluator: &SignalEvaluator<'_>,
    store: &dyn SignalStore,
    auto_buy: bool,
) -> Result<TickSummary, RunnerError> {
    let mut summary = TickSummary::default();

    for mut signal in store.all()? {
        if signal.status.is_terminal() {
            continue;
        }
        summary.processed += 1;

        match cycle(evaluator, &mut signal, auto_buy) {
            Ok(Step::Evaluated(outcome)) => summary.record(&outcome),
            Ok(Step::Bought) => summary.bought += 1,
            Err(err) => {
                summary.failed += 1;
                if err.is_retryable() {
                    warn!(signal = %signal.id, %err, "cycle failed, will retry next tick");
                } else {
                    warn!(signal = %signal.id, %err, "cycle failed");
                }
            }
        }
    }

    info!(
        processed = summary.processed,
        bought = summary.bought,
        sold = summary.sold,
        filled = summary.filled,
        cancelled = summary.cancelled,
        holding = summary.holding,
        failed = summary.failed,
        "tick complete"
    );
    Ok(summary)
}

enum Step {
    Evaluated(CycleOutcome),
    Bought,
}

fn cycle(
    evaluator: &SignalEvaluator<'_>,
    signal: &mut Signal,
    auto_buy: bool,
) -> Result<Step, EvaluatorError> {
    let outcome = evaluator.process(signal)?;
    if auto_buy && signal.status == SignalStatus::PendingBuy {
        if let Some(price) = signal.current_price {
            evaluator.buy(signal, price)?;
            return Ok(Step::Bought);
        }
    }
    Ok(Step::Evaluated(outcome))
}

//! Domain types for the signal bot

pub mod ids;
pub mod order;
pub mod signal;
pub mod status;

pub use ids::{OrderId, SignalId};
pub use order::{Balance, Fill, OrderSide, OrderSnapshot, Placement};
pub use signal::{Execution, Signal, SignalConfigError, Threshold};
pub use status::{SignalEvent, SignalStatus, TransitionError, UnknownStatusCode};

//! Signal lifecycle states and the single transition table.
//!
//! Live venues move a signal through both open-order states; simulated venues
//! fill on placement, so `PendingBuy -> Held` and `Held -> Closed` happen in
//! one step. Only open-order states can end in `Cancelled`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a signal, persisted as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignalStatus {
    PendingBuy,
    BuyOrderOpen,
    Held,
    SellOrderOpen,
    Closed,
    Cancelled,
}

/// Something that happened to a signal's order flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// A buy order is resting on the venue.
    BuyPlaced,
    /// The buy completed (immediately for simulated venues).
    BuyFilled,
    /// A sell order is resting on the venue.
    SellPlaced,
    /// The sell completed (immediately for simulated venues).
    SellFilled,
    /// The venue closed an open order after a cancel request.
    OrderCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("invalid transition: {event:?} is not allowed from {from}")]
    NotAllowed {
        from: SignalStatus,
        event: SignalEvent,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal status code {0} (expected 1..=6)")]
pub struct UnknownStatusCode(pub u8);

impl SignalStatus {
    pub fn code(self) -> u8 {
        match self {
            SignalStatus::PendingBuy => 1,
            SignalStatus::BuyOrderOpen => 2,
            SignalStatus::Held => 3,
            SignalStatus::SellOrderOpen => 4,
            SignalStatus::Closed => 5,
            SignalStatus::Cancelled => 6,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SignalStatus::Closed | SignalStatus::Cancelled)
    }

    pub fn has_open_order(self) -> bool {
        matches!(self, SignalStatus::BuyOrderOpen | SignalStatus::SellOrderOpen)
    }

    /// Apply an event, returning the next state.
    ///
    /// This is the only place a signal's status is advanced.
    pub fn apply(self, event: SignalEvent) -> Result<SignalStatus, TransitionError> {
        use SignalEvent::*;
        use SignalStatus::*;

        let next = match (self, event) {
            (PendingBuy, BuyPlaced) => BuyOrderOpen,
            (PendingBuy, BuyFilled) => Held,
            (BuyOrderOpen, BuyFilled) => Held,
            (Held, SellPlaced) => SellOrderOpen,
            (Held, SellFilled) => Closed,
            (SellOrderOpen, SellFilled) => Closed,
            (BuyOrderOpen | SellOrderOpen, OrderCancelled) => Cancelled,
            (from, event) => return Err(TransitionError::NotAllowed { from, event }),
        };
        Ok(next)
    }
}

impl TryFrom<u8> for SignalStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SignalStatus::PendingBuy),
            2 => Ok(SignalStatus::BuyOrderOpen),
            3 => Ok(SignalStatus::Held),
            4 => Ok(SignalStatus::SellOrderOpen),
            5 => Ok(SignalStatus::Closed),
            6 => Ok(SignalStatus::Cancelled),
            other => Err(UnknownStatusCode(other)),
        }
    }
}

impl From<SignalStatus> for u8 {
    fn from(status: SignalStatus) -> u8 {
        status.code()
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalStatus::PendingBuy => "pending buy",
            SignalStatus::BuyOrderOpen => "buy order open",
            SignalStatus::Held => "held",
            SignalStatus::SellOrderOpen => "sell order open",
            SignalStatus::Closed => "closed",
            SignalStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

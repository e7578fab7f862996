use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal identifier, assigned by the store that creates the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub u64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange order identifier (the venue's uuid, or `DEMO` for simulated fills).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Identifier recorded for fills synthesized by the simulated venue.
    pub const DEMO: &'static str = "DEMO";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn demo() -> Self {
        Self(Self::DEMO.to_string())
    }

    pub fn is_demo(&self) -> bool {
        self.0 == Self::DEMO
    }

    /// Venues sometimes answer with an empty id instead of an error.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_order_id() {
        assert!(OrderId::demo().is_demo());
        assert!(!OrderId::new("a1b2").is_demo());
    }

    #[test]
    fn blank_order_id() {
        assert!(OrderId::new("  ").is_blank());
        assert!(!OrderId::new("x").is_blank());
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&SignalId(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&OrderId::demo()).unwrap(), "\"DEMO\"");
    }
}

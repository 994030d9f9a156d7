//! Identifier types
//!
//! Orders carry a UUID v7 so log lines can be correlated in submission order.
//! Instruments are interned into dense numeric ids through an explicit
//! registry instead of being compared by string hash.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an order
///
/// Uses UUID v7 for time-based sorting. Only used for diagnostics; it never
/// appears in protocol output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Create a new OrderId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interned instrument identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(u32);

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry mapping instrument symbols to ids.
///
/// Ids are handed out densely in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    by_symbol: HashMap<String, InstrumentId>,
    symbols: Vec<String>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `symbol`, registering it on first sight.
    pub fn intern(&mut self, symbol: &str) -> InstrumentId {
        if let Some(id) = self.by_symbol.get(symbol) {
            return *id;
        }
        let id = InstrumentId(self.symbols.len() as u32);
        self.symbols.push(symbol.to_string());
        self.by_symbol.insert(symbol.to_string(), id);
        id
    }

    /// Look up an already registered symbol.
    pub fn get(&self, symbol: &str) -> Option<InstrumentId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_creation() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2, "OrderIds should be unique");
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_intern_is_stable() {
        let mut registry = InstrumentRegistry::new();
        let eur = registry.intern("EURUSD");
        let gbp = registry.intern("GBPUSD");
        assert_ne!(eur, gbp);
        assert_eq!(registry.intern("EURUSD"), eur);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_symbol() {
        let mut registry = InstrumentRegistry::new();
        let id = registry.intern("USDJPY");
        assert_eq!(registry.get("USDJPY"), Some(id));
        assert_eq!(registry.get("AUDUSD"), None);
    }

    #[test]
    fn test_instruments_are_case_sensitive() {
        let mut registry = InstrumentRegistry::new();
        let upper = registry.intern("EURUSD");
        let lower = registry.intern("eurusd");
        assert_ne!(upper, lower);
    }
}

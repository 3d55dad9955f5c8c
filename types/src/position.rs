use std::collections::HashMap;

use crate::Decimal;

/// `symbol -> signed quantity`, with union-of-keys, missing-as-zero
/// equality — the same rationale as [`crate::Balance`]: a symbol with a
/// flat (zero) position is frequently dropped from the exchange's
/// response rather than reported explicitly.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Position(pub HashMap<String, Decimal>);

impl Position {
    pub fn new(inner: HashMap<String, Decimal>) -> Self { Self(inner) }

    pub fn get(&self, symbol: &str) -> Decimal { self.0.get(symbol).copied().unwrap_or(Decimal::ZERO) }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        let keys = self.0.keys().chain(other.0.keys());
        keys.into_iter().all(|k| self.get(k) == other.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_position_equals_absent_entry() {
        let a = Position::new(HashMap::from([("BTC_USDT".to_string(), Decimal::ZERO)]));
        let b = Position::new(HashMap::new());
        assert_eq!(a, b);
    }

    #[test]
    fn nonzero_position_is_detected() {
        let a = Position::new(HashMap::from([("BTC_USDT".to_string(), Decimal::ONE)]));
        let b = Position::new(HashMap::new());
        assert_ne!(a, b);
    }
}

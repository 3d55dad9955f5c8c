use std::collections::HashMap;

use crate::Decimal;

/// A single asset's balance. Missing assets in a [`Balance`] map default
/// to `free = locked = total = Decimal::ZERO, debt = None` (spec.md §3).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssetBalance {
    pub free: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
    pub debt: Option<Decimal>,
}

/// `asset -> balance`, with union-of-keys, missing-as-zero equality.
///
/// Two snapshots taken seconds apart from the same account frequently
/// carry a different key set (an asset with a zero balance is dropped
/// by some exchanges, kept by others) without any actual change in
/// holdings; comparing raw maps would treat that as a change on every
/// poll. Comparing by the union of keys, defaulting absent entries to
/// zero, makes that a non-change.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Balance(pub HashMap<String, AssetBalance>);

impl Balance {
    pub fn new(inner: HashMap<String, AssetBalance>) -> Self { Self(inner) }

    pub fn get(&self, asset: &str) -> AssetBalance { self.0.get(asset).copied().unwrap_or_default() }
}

impl PartialEq for Balance {
    fn eq(&self, other: &Self) -> bool {
        let keys = self.0.keys().chain(other.0.keys());
        keys.into_iter().all(|k| self.get(k) == other.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bal(asset: &str, free: Decimal) -> Balance {
        let mut m = HashMap::new();
        m.insert(asset.to_string(), AssetBalance {
            free,
            ..Default::default()
        });
        Balance::new(m)
    }

    #[test]
    fn missing_key_defaults_to_zero() {
        let a = bal("BTC", Decimal::ONE);
        let mut inner = a.0.clone();
        inner.insert("ETH".to_string(), AssetBalance::default());
        let b = Balance::new(inner);
        assert_eq!(a, b, "an explicit zero-balance entry must equal an absent one");
    }

    #[test]
    fn differing_free_amount_is_unequal() {
        let a = bal("BTC", Decimal::ONE);
        let b = bal("BTC", Decimal::from(2));
        assert_ne!(a, b);
    }
}

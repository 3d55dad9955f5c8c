use std::collections::HashMap;

use crate::Decimal;

/// Buy or sell, derived from the sign of [`Order::amount`] — never stored
/// independently, so it can never disagree with the amount it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Order type/time-in-force, the spec's `type?` field. Named `kind` to
/// avoid shadowing the `type` keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Limit,
    Market,
    Gtc,
    Ioc,
    Fok,
}

/// A single order: `{ id, price?, amount (signed), type? }`.
///
/// `amount` is positive for a buy, negative for a sell — this is the
/// canonical convention every adapter must follow (see DESIGN.md on the
/// `upbit`-style "side read after assignment" bug this avoids by
/// construction: there is no independent `side` field to get out of sync
/// with `amount`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: String,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub kind: Option<OrderKind>,
}

impl Order {
    pub fn side(&self) -> Side {
        if self.amount.is_sign_negative() {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

/// A snapshot of open orders. Equality compares only the *set of ids*
/// present, not the orders' other fields (spec.md §4.I) — a partial fill
/// that leaves the order open is not, by itself, a change the router
/// needs to react to.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct OrderSet(pub HashMap<String, Order>);

impl OrderSet {
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self(orders.into_iter().map(|o| (o.id.clone(), o)).collect())
    }

    pub fn get(&self, id: &str) -> Option<&Order> { self.0.get(id) }
}

impl PartialEq for OrderSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.keys().all(|id| other.0.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(id: &str, amount: Decimal) -> Order {
        Order {
            id: id.to_string(),
            price: Some(dec!(100)),
            amount,
            kind: Some(OrderKind::Limit),
        }
    }

    #[test]
    fn side_follows_amount_sign() {
        assert_eq!(order("a", dec!(1)).side(), Side::Buy);
        assert_eq!(order("a", dec!(-1)).side(), Side::Sell);
    }

    #[test]
    fn order_set_equality_ignores_field_changes_on_same_ids() {
        let a = OrderSet::new([order("1", dec!(1))]);
        let b = OrderSet::new([order("1", dec!(0.5))]);
        assert_eq!(a, b, "same id set, differing fields, still equal per the id-set rule");
    }

    #[test]
    fn order_set_equality_detects_added_or_removed_ids() {
        let a = OrderSet::new([order("1", dec!(1))]);
        let b = OrderSet::new([order("1", dec!(1)), order("2", dec!(1))]);
        assert_ne!(a, b);
    }
}

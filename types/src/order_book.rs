use crate::Decimal;

/// A single price level: `(price, quantity)`.
pub type Level = (Decimal, Decimal);

/// A snapshot of an order book. `bids` are sorted descending by price,
/// `asks` ascending, as delivered by the adapter's parse callback.
///
/// Equality is element-wise in order: two books with the same levels in
/// a different order are *not* equal. This is deliberate — a reordering
/// without a value change should never happen from a well-behaved
/// adapter, and treating it as a change is cheaper than re-sorting on
/// every comparison.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct OrderBook {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
}

impl OrderBook {
    pub fn new(bids: Vec<Level>, asks: Vec<Level>) -> Self { Self { bids, asks } }

    pub fn best_bid(&self) -> Option<Level> { self.bids.first().copied() }

    pub fn best_ask(&self) -> Option<Level> { self.asks.first().copied() }
}

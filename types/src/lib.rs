//! Canonical container shapes shared between the engine and exchange
//! adapters: order books, balances, positions and orders.
//!
//! These types exist so that a single, adapter-agnostic notion of
//! "did this value actually change" can drive the router's change-only
//! delivery. Adapters are expected to parse exchange payloads into these
//! shapes rather than inventing their own, so that they benefit from the
//! equality semantics defined here.

pub mod balance;
pub mod order;
pub mod order_book;
pub mod position;

pub use balance::Balance;
pub use order::{Order, OrderKind, OrderSet, Side};
pub use order_book::OrderBook;
pub use position::Position;

/// House fixed-point type. All prices, quantities and balances in the
/// engine are `Decimal` — trading math must not suffer binary-floating
/// point error.
pub use rust_decimal::Decimal;

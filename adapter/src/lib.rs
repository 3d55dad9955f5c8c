//! One worked exchange-adapter capability set (spec.md §6), proving that
//! `engine::StrategyCtx::register`/`send` is enough to build a real
//! adapter surface on top of. An adapter module exports
//! `{ subscribe_orderbook, subscribe_balance, subscribe_position?,
//! subscribe_orders, limit_order, market_order, cancel_order }`; this
//! crate provides exactly that set for a single `demo_exchange`, plus the
//! market-identifier grammar parser every adapter starts from.

pub mod demo_exchange;
pub mod error;
pub mod market;

pub use error::Error;
pub use market::{MarketId, MarketType};

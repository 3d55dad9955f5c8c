//! Example strategy bodies written against `engine`'s and `adapter`'s
//! public API: documentation for strategy authors, and integration-test
//! fixtures for the scheduler and router.

pub mod flaky;
pub mod spread_watcher;

use engine::StrategyRegistry;

/// Builds the registry the demo `runtime` binary (and this crate's own
/// tests) drive an [`engine::Executor`] with, all strategies pointed at
/// the same `demo_exchange` base URL.
pub fn registry(base: impl Into<String>) -> StrategyRegistry {
    let base = base.into();
    let mut reg = StrategyRegistry::new();

    let spread_base = base.clone();
    reg.register("spread_watcher", move |ctx| {
        let base = spread_base.clone();
        let left: adapter::MarketId = "spot:BTC/USDT".parse().expect("valid market id literal");
        let right: adapter::MarketId = "spot:BTC/USDC".parse().expect("valid market id literal");
        spread_watcher::run(ctx, base, left, right)
    });

    let flaky_base = base.clone();
    reg.register("flaky", move |ctx| {
        let base = flaky_base.clone();
        let market: adapter::MarketId = "spot:ETH/USDT".parse().expect("valid market id literal");
        flaky::run(ctx, base, market)
    });

    reg
}

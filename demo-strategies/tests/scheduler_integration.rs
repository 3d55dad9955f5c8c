//! End-to-end exercise of `demo_strategies::registry` wired into a real
//! `engine::Executor` against `host::MockHost`, proving the scheduler,
//! router and send helper compose the way `engine`'s own unit tests check
//! them in isolation. Mirrors the teacher's crate-level `tests/` directory
//! convention (see `strategies/tests/mean_reverting_backtest.rs`).

use std::sync::Arc;
use std::time::Duration;

use engine::Executor;
use host::{Event, MockHost};

const BASE: &str = "https://x";

/// Yields to the scheduler until `cond` is true, so this test isn't pinned
/// to an exact number of scheduling passes between a pushed event and the
/// strategy task observing it.
async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition was never satisfied");
}

fn orderbook_payload(url: &str, bid: &str, ask: &str) -> Event {
    Event::FetcherResponse(host::FetcherResponse {
        url: url.to_string(),
        env_suffix: None,
        content: format!(r#"{{"bids":[[{bid},"1"]],"asks":[[{ask},"1"]]}}"#),
        status: 200,
        error: false,
    })
}

/// `spread_watcher` registers two order-book subscriptions; the warm-up
/// gate (spec.md §8 scenario 1) must hold the strategy's callback until
/// both have delivered, and a wide enough spread must then drive a `send()`
/// order placement all the way through `host::MockHost`.
#[tokio::test]
async fn spread_watcher_places_an_order_once_both_books_are_warm() {
    let host = Arc::new(MockHost::new(["spread_watcher", "flaky"]));
    let registry = demo_strategies::registry(BASE);
    let mut executor = Executor::new(host.clone(), registry);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            executor.start().await.unwrap();
            assert_eq!(
                host.subscriptions().len(),
                3,
                "spread_watcher registers two order-book subscriptions, flaky registers one"
            );

            let run = tokio::task::spawn_local(async move { executor.run().await });

            let left_url = format!("{BASE}/orderbook/BTCUSDT");
            let right_url = format!("{BASE}/orderbook/BTCUSDC");

            // left's best ask is 101; right's best bid (105) undercuts it by
            // more than spread_watcher's 0.50 threshold once both are warm.
            host.push_event(orderbook_payload(&left_url, "100", "101"));
            tokio::task::yield_now().await;
            assert!(host.sent_requests().is_empty(), "must not fire until both books are warm");

            host.push_event(orderbook_payload(&right_url, "105", "106"));
            wait_until(|| !host.sent_requests().is_empty()).await;

            let (_, req) = host.sent_requests().into_iter().next().unwrap();
            assert_eq!(req.url, format!("{BASE}/orders"), "the spread breach must place an order");

            host.push_event(Event::Signal(host::Signal::Terminate));
            let _ = tokio::time::timeout(Duration::from_secs(2), run).await;
        })
        .await;
}

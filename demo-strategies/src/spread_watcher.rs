use std::rc::Rc;

use adapter::demo_exchange;
use adapter::market::MarketId;
use engine::{ResultsTable, StrategyCtx, SubscriptionId, UserCallbackOutcome};
use rust_decimal::Decimal;

/// Spread threshold above which `run` places a limit order on the cheaper
/// market (an arbitrary demo value, not a production signal).
fn spread_threshold() -> Decimal { Decimal::new(50, 2) }

/// Watches the same symbol on two markets of one `demo_exchange` base URL
/// and places a limit order whenever the cross-market spread exceeds
/// [`spread_threshold`]. Exercises two subscriptions, the warm-up gate,
/// change-only delivery, and `send()` (the order placement) in one
/// strategy body.
pub async fn run(ctx: Rc<StrategyCtx>, base: String, left: MarketId, right: MarketId) -> anyhow::Result<()> {
    let left_ob = demo_exchange::subscribe_orderbook(&ctx, &base, &left).await?;
    let right_ob = demo_exchange::subscribe_orderbook(&ctx, &base, &right).await?;

    let cb_ctx = ctx.clone();
    ctx.on(move |results: ResultsTable, _changed: SubscriptionId| {
        let ctx = cb_ctx.clone();
        let base = base.clone();
        let left = left.clone();
        let left_ob = left_ob.clone();
        let right_ob = right_ob.clone();
        async move {
            let (Some(l), Some(r)) = (left_ob.get(&results), right_ob.get(&results)) else {
                return Ok(());
            };
            let (Some((ask, _)), Some((bid, _))) = (l.best_ask(), r.best_bid()) else {
                return Ok(());
            };
            let spread = bid - ask;
            if spread <= spread_threshold() {
                return Ok(());
            }
            tracing::info!(strategy = "spread_watcher", %spread, "arbitrage spread detected");
            demo_exchange::limit_order(&ctx, &base, &left, ask, Decimal::ONE)
                .await
                .map(|_| ())
                .map_err(|err| UserCallbackOutcome::Failed(err.into()))
        }
    })
    .await?;
    Ok(())
}

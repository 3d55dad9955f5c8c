use std::cell::Cell;
use std::rc::Rc;

use adapter::demo_exchange;
use adapter::market::MarketId;
use engine::StrategyCtx;

/// Fails on its third resume, demonstrating the executor's restart-on-
/// failure sweep (spec.md §8 scenario 4): the task that replaces it gets a
/// fresh [`StrategyCtx`], so its subscription identifiers start back at 1
/// and its resume counter starts back at zero. Also registers an atexit
/// handler so a restart's cleanup path is exercised too.
pub async fn run(ctx: Rc<StrategyCtx>, base: String, market: MarketId) -> anyhow::Result<()> {
    let ob = demo_exchange::subscribe_orderbook(&ctx, &base, &market).await?;
    let resumes = Rc::new(Cell::new(0u32));

    let atexit_resumes = resumes.clone();
    ctx.atexit(move || async move {
        tracing::info!(resumes = atexit_resumes.get(), "flaky strategy shutting down");
        Ok(())
    });

    let cb_resumes = resumes.clone();
    ctx.on(move |results, _changed| {
        let resumes = cb_resumes.clone();
        let ob = ob.clone();
        async move {
            let _ = ob.get(&results);
            let n = resumes.get() + 1;
            resumes.set(n);
            if n == 3 {
                return Err(anyhow::anyhow!("flaky strategy failing on its third resume").into());
            }
            Ok(())
        }
    })
    .await?;
    Ok(())
}

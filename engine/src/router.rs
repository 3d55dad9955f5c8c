use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use host::{Event, FetcherResponse, Request};
use rust_decimal::Decimal;

use crate::ctx::StrategyCtx;
use crate::error::RouterError;
use crate::subscription::{Extractor, Fingerprint, SubscriptionId, Subscriptions};

/// A strategy's type-erased "last parsed value per subscription" table,
/// handed to the `on` callback so it can read any subscription's current
/// value, not just the one that just changed.
#[derive(Default, Clone)]
pub struct ResultsTable(HashMap<SubscriptionId, Rc<dyn Any>>);

impl ResultsTable {
    pub(crate) fn get<T: 'static>(&self, id: SubscriptionId) -> Option<Rc<T>> {
        self.0.get(&id).and_then(|v| v.clone().downcast::<T>().ok())
    }

    pub(crate) fn set<T: 'static>(&mut self, id: SubscriptionId, value: T) {
        self.0.insert(id, Rc::new(value));
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool { self.0.contains_key(&id) }
}

#[derive(Default)]
pub(crate) struct RouterState {
    subscriptions: Subscriptions,
    results: ResultsTable,
    recent_payloads: HashMap<Fingerprint, FetcherResponse>,
    warm: bool,
}

impl RouterState {
    fn take_any_pending(&mut self) -> Option<(Fingerprint, FetcherResponse)> {
        let fingerprint = self.recent_payloads.keys().next().cloned()?;
        let payload = self.recent_payloads.remove(&fingerprint)?;
        Some((fingerprint, payload))
    }
}

/// Outcome a user callback reports back to `on` (spec.md §4.C step 7):
/// `Exit` unwinds the strategy's main loop cleanly, anything else is
/// logged and the loop keeps running.
#[derive(Debug)]
pub enum UserCallbackOutcome {
    Exit,
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for UserCallbackOutcome {
    fn from(err: anyhow::Error) -> Self { Self::Failed(err) }
}

/// The `exit()` sentinel (spec.md §4.C): `on(|results, changed| { ...
/// router::exit() })` unwinds the loop without being treated as a
/// failure.
pub fn exit<T>() -> Result<T, UserCallbackOutcome> { Err(UserCallbackOutcome::Exit) }

const COOPERATIVE_WARN_MS: i64 = 50;
const WALL_WARN_MS: i64 = 1500;

impl StrategyCtx {
    /// Registers a subscription (spec.md §4.D): idempotent per
    /// fingerprint, asks the host to poll `request` every `period_ms`, and
    /// returns a typed handle to the subscription's last-parsed value.
    pub async fn register<T>(
        &self,
        request: Request,
        period_ms: u64,
        parse: impl Fn(&str) -> anyhow::Result<T> + 'static,
    ) -> host::Result<Extractor<T>>
    where
        T: PartialEq + 'static,
    {
        let fingerprint = Fingerprint::from_request(&request);
        let id = self.router.borrow_mut().subscriptions.register(fingerprint, parse);
        self.host.subscribe(request, period_ms).await?;
        Ok(Extractor::new(id))
    }

    /// Called by the executor whenever a fetcher event arrives; buffers
    /// the payload if this strategy has a matching subscription, and is a
    /// no-op otherwise (spec.md §4.C step 1 / §4.H step 3).
    pub(crate) fn deliver_fetcher_payload(&self, payload: FetcherResponse) {
        let fingerprint = Fingerprint::from_fetcher_response(&payload);
        let mut router = self.router.borrow_mut();
        if router.subscriptions.contains(&fingerprint) {
            router.recent_payloads.insert(fingerprint, payload);
        }
    }

    /// The per-strategy router's main loop (spec.md §4.C), implemented as
    /// the seven numbered steps exactly:
    /// 1. pull a buffered payload or suspend until one arrives
    /// 2. parse it through the subscription it belongs to
    /// 3. on parse failure, log and go back to step 1
    /// 4. skip dispatch if the parsed value didn't change
    /// 5. skip dispatch until every subscription has a value (warm-up gate)
    /// 6. run `user_cb` with the timer wrapped around it, report the timing
    /// 7. `exit()` unwinds cleanly; any other failure is logged and the
    ///    loop continues
    pub async fn on<F, Fut>(&self, mut user_cb: F) -> anyhow::Result<()>
    where
        F: FnMut(ResultsTable, SubscriptionId) -> Fut,
        Fut: std::future::Future<Output = Result<(), UserCallbackOutcome>>,
    {
        loop {
            let (fingerprint, payload) = loop {
                if let Some(pending) = self.router.borrow_mut().take_any_pending() {
                    break pending;
                }
                let registered = self.router.borrow().subscriptions.fingerprints();
                self.yield_want(move |ev: &Event| match ev {
                    Event::FetcherResponse(fr) if registered.contains(&Fingerprint::from_fetcher_response(fr)) => Some(()),
                    _ => None,
                })
                .await;
            };

            let id = match self.router.borrow().subscriptions.id_of(&fingerprint) {
                Some(id) => id,
                None => continue,
            };

            let changed = {
                let mut router = self.router.borrow_mut();
                let RouterState { subscriptions, results, .. } = &mut *router;
                match subscriptions.deliver(&fingerprint, results, &payload.content) {
                    Some(Ok(changed)) => changed,
                    Some(Err(RouterError::ParseFailure { fingerprint, source })) => {
                        tracing::error!(strategy = %self.name, %fingerprint, error = %source, "failed to parse subscription payload");
                        continue;
                    }
                    Some(Err(other)) => return Err(other.into()),
                    None => continue,
                }
            };
            if !changed {
                continue;
            }

            let warm_now = {
                let mut router = self.router.borrow_mut();
                if !router.warm {
                    router.warm = router.subscriptions.ids().all(|id| router.results.contains(id));
                }
                router.warm
            };
            if !warm_now {
                continue;
            }

            self.timer.borrow_mut().start();
            let results_snapshot = self.router.borrow().results.clone();
            let result = user_cb(results_snapshot, id).await;
            let (cooperative_ms, wall_ms) = self.timer.borrow_mut().stop().expect("timer was just started");
            self.host.report_timings(&self.name, cooperative_ms, wall_ms);
            if cooperative_ms > Decimal::from(COOPERATIVE_WARN_MS) {
                tracing::warn!(strategy = %self.name, %cooperative_ms, "strategy callback exceeded the cooperative time budget");
            }
            if wall_ms > Decimal::from(WALL_WARN_MS) {
                tracing::warn!(strategy = %self.name, %wall_ms, "strategy callback exceeded the wall time budget");
            }

            match result {
                Ok(()) => {}
                Err(UserCallbackOutcome::Exit) => return Ok(()),
                Err(UserCallbackOutcome::Failed(err)) => {
                    tracing::error!(strategy = %self.name, error = %err, "strategy callback failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Arc;

    use host::MockHost;

    fn ctx(host: Arc<MockHost>) -> Rc<StrategyCtx> {
        Rc::new(StrategyCtx::new("demo", host))
    }

    fn fetcher_response(url: &str, content: &str) -> FetcherResponse {
        FetcherResponse { url: url.to_string(), env_suffix: None, content: content.to_string(), status: 200, error: false }
    }

    #[tokio::test]
    async fn register_is_idempotent_per_fingerprint() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        let a = c.register(Request::get("https://x/orderbook"), 500, |s: &str| Ok(s.to_string())).await.unwrap();
        let b = c.register(Request::get("https://x/orderbook"), 500, |s: &str| Ok(s.to_string())).await.unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(host.subscriptions().len(), 2, "subscribe is still called each time; only the id is shared");
    }

    /// Scenario 1 (spec.md §8): the user callback must not fire until
    /// every registered subscription has at least one parsed value.
    #[tokio::test]
    async fn warm_up_gate_blocks_the_callback_until_every_subscription_has_a_value() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        c.register(Request::get("https://x/a"), 500, |s: &str| Ok(s.to_string())).await.unwrap();
        c.register(Request::get("https://x/b"), 500, |s: &str| Ok(s.to_string())).await.unwrap();

        let calls = Rc::new(RefCell::new(0u32));
        let cb_calls = calls.clone();
        let local = tokio::task::LocalSet::new();
        let c2 = c.clone();
        let on_task = local.spawn_local(async move {
            c2.on(move |_results, _id| {
                let calls = cb_calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    Ok(())
                }
            })
            .await
        });

        local
            .run_until(async {
                tokio::task::yield_now().await;
                let fr_a = fetcher_response("https://x/a", "a1");
                c.deliver_fetcher_payload(fr_a.clone());
                c.try_resume(&Event::FetcherResponse(fr_a));
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 0, "must not fire until every subscription has a value");

                let fr_b = fetcher_response("https://x/b", "b1");
                c.deliver_fetcher_payload(fr_b.clone());
                c.try_resume(&Event::FetcherResponse(fr_b));
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 1, "now that both subscriptions are populated, the callback must fire exactly once");
            })
            .await;
        on_task.abort();
    }

    /// Scenario 2 (spec.md §8): identical consecutive parses are
    /// deduplicated; a genuinely different parse triggers one more call.
    #[tokio::test]
    async fn identical_parses_are_delivered_at_most_once() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        c.register(Request::get("https://x/ob"), 500, |s: &str| Ok(s.to_string())).await.unwrap();

        let calls = Rc::new(RefCell::new(0u32));
        let cb_calls = calls.clone();
        let local = tokio::task::LocalSet::new();
        let c2 = c.clone();
        let on_task = local.spawn_local(async move {
            c2.on(move |_results, _id| {
                let calls = cb_calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    Ok(())
                }
            })
            .await
        });

        local
            .run_until(async {
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                    let fr = fetcher_response("https://x/ob", "same");
                    c.deliver_fetcher_payload(fr.clone());
                    c.try_resume(&Event::FetcherResponse(fr));
                }
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 1, "three identical payloads must dispatch only once");

                let fr = fetcher_response("https://x/ob", "different");
                c.deliver_fetcher_payload(fr.clone());
                c.try_resume(&Event::FetcherResponse(fr));
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 2, "a changed payload must dispatch one more time");
            })
            .await;
        on_task.abort();
    }

    #[tokio::test]
    async fn a_parse_failure_is_logged_and_does_not_stop_the_loop() {
        let host = Arc::new(MockHost::new(["demo"]));
        let c = ctx(host.clone());
        c.register(Request::get("https://x/ob"), 500, |s: &str| {
            if s == "bad" {
                anyhow::bail!("not valid json");
            }
            Ok(s.to_string())
        })
        .await
        .unwrap();

        let calls = Rc::new(RefCell::new(0u32));
        let cb_calls = calls.clone();
        let local = tokio::task::LocalSet::new();
        let c2 = c.clone();
        let on_task = local.spawn_local(async move {
            c2.on(move |_results, _id| {
                let calls = cb_calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    Ok(())
                }
            })
            .await
        });

        local
            .run_until(async {
                tokio::task::yield_now().await;
                let bad = fetcher_response("https://x/ob", "bad");
                c.deliver_fetcher_payload(bad.clone());
                c.try_resume(&Event::FetcherResponse(bad));
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 0);

                let good = fetcher_response("https://x/ob", "good");
                c.deliver_fetcher_payload(good.clone());
                c.try_resume(&Event::FetcherResponse(good));
                tokio::task::yield_now().await;
                assert_eq!(*calls.borrow(), 1, "the loop must recover after a parse failure");
            })
            .await;
        on_task.abort();
    }
}

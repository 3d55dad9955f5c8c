use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use host::{Event, Host, Signal};
use tokio::task::JoinHandle;

use crate::ctx::StrategyCtx;
use crate::error::ExecutorError;
use crate::metrics;
use crate::store::StrategyStore;

/// The shutdown deadline spec.md §4.H names explicitly: `clear_strategies`
/// stops waiting on strategies' atexit handlers after this long, even if
/// some are still running.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_millis(5000);

pub type StrategyBody = Rc<dyn Fn(Rc<StrategyCtx>) -> Pin<Box<dyn Future<Output = anyhow::Result<()>>>>>;

/// Maps a strategy name to the async function that runs it. Supplied by
/// whatever crate owns the concrete strategy bodies (`demo-strategies` in
/// this workspace); the executor itself only knows how to spawn, restart
/// and tear one down.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    factories: std::collections::HashMap<String, StrategyBody>,
}

impl StrategyRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register<F, Fut>(&mut self, name: impl Into<String>, body: F)
    where
        F: Fn(Rc<StrategyCtx>) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.factories.insert(name.into(), Rc::new(move |ctx| Box::pin(body(ctx))));
    }

    fn get(&self, name: &str) -> Option<StrategyBody> { self.factories.get(name).cloned() }

    /// The strategy names this registry knows how to build, for a host
    /// that wants to discover strategies from the registry itself rather
    /// than from its own independent configuration.
    pub fn names(&self) -> Vec<String> { self.factories.keys().cloned().collect() }
}

struct StrategyTask {
    ctx: Rc<StrategyCtx>,
    join: JoinHandle<anyhow::Result<()>>,
}

/// The single-threaded scheduler (spec.md §4.H). Every method here assumes
/// it is being polled from inside a `tokio::task::LocalSet` (entered once
/// by the caller via `LocalSet::run_until`, per tokio's own restriction
/// against nesting one `run_until` inside another) — strategies run as
/// tasks on that same `LocalSet`, bound to one OS thread and never polled
/// concurrently with one another, so "no parallel strategy execution"
/// (spec.md §5) is a property of how this type is driven rather than a
/// convention callers have to honor.
pub struct Executor {
    host: Arc<dyn Host>,
    registry: StrategyRegistry,
    strategies: StrategyStore,
    tasks: std::collections::HashMap<String, StrategyTask>,
    shutdown_deadline: Duration,
}

impl Executor {
    pub fn new(host: Arc<dyn Host>, registry: StrategyRegistry) -> Self {
        Self {
            host,
            registry,
            strategies: StrategyStore::new(),
            tasks: std::collections::HashMap::new(),
            shutdown_deadline: SHUTDOWN_DEADLINE,
        }
    }

    pub fn with_shutdown_deadline(mut self, deadline: Duration) -> Self {
        self.shutdown_deadline = deadline;
        self
    }

    /// Spawns every strategy the host lists, running each until it first
    /// suspends; a failure before the first suspend is fatal to startup
    /// for that strategy (spec.md §4.H).
    pub async fn start(&mut self) -> Result<(), ExecutorError> {
        for name in self.host.list_strategies() {
            self.spawn_strategy(&name).await?;
        }
        Ok(())
    }

    async fn spawn_strategy(&mut self, name: &str) -> Result<(), ExecutorError> {
        self.host.reset_metrics(name);
        let factory = self.registry.get(name).ok_or_else(|| ExecutorError::StartupError(name.to_string()))?;
        let ctx = Rc::new(StrategyCtx::new(name.to_string(), self.host.clone()));
        let body = factory(ctx.clone());
        let join = tokio::task::spawn_local(body);

        // Drive the task forward to its first suspend point before
        // startup is considered complete for this strategy.
        tokio::task::yield_now().await;

        if join.is_finished() {
            return match join.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(ExecutorError::StartupError(format!("{name}: {err}"))),
                Err(join_err) => Err(ExecutorError::StartupError(format!("{name}: {join_err}"))),
            };
        }

        self.strategies.insert(ctx.clone());
        self.tasks.insert(name.to_string(), StrategyTask { ctx, join });
        Ok(())
    }

    /// The main dispatch loop: drains events from the host and, for each,
    /// delivers it to every live strategy per spec.md §4.H, then sweeps
    /// dead tasks. Returns once a `Signal` event is observed or the event
    /// stream closes — both are a clean reason to stop, not an internal
    /// error, so the return type just carries which.
    pub async fn run(&mut self) -> ExecutorError {
        loop {
            let event = match self.host.next_event().await {
                Some(event) => event,
                None => return ExecutorError::Runtime(anyhow::anyhow!("host event stream closed")),
            };

            match &event {
                Event::Signal(signal) => return ExecutorError::Interrupt(*signal),
                Event::FetcherResponse(fr) if fr.error => {
                    tracing::error!(url = %fr.url, status = fr.status, "fetcher reported an error; event discarded");
                }
                Event::FetcherResponse(fr) => {
                    for task in self.tasks.values() {
                        task.ctx.deliver_fetcher_payload(fr.clone());
                    }
                    self.resume_wants(&event);
                }
                Event::SendResponse(_) => {
                    self.resume_wants(&event);
                }
            }

            // Let every strategy woken above run to its next suspend point.
            tokio::task::yield_now().await;
            self.sweep().await;
        }
    }

    fn resume_wants(&self, event: &Event) {
        for task in self.tasks.values() {
            task.ctx.try_resume(event);
        }
    }

    /// Tears down any strategy whose task has finished, running its atexit
    /// handlers and clearing its local state (spec.md §4.H step 4). A
    /// strategy that died with an error is restarted fresh, so its
    /// subscription identifiers and warm-up gate start over (spec.md §8
    /// scenario 4); one that returned cleanly (the `exit()` sentinel) is
    /// simply dropped — clean completion means no restart, per spec.md §3's
    /// strategy lifecycle.
    async fn sweep(&mut self) {
        let dead: Vec<String> =
            self.tasks.iter().filter(|(_, task)| task.join.is_finished()).map(|(name, _)| name.clone()).collect();

        for name in dead {
            let mut failed = false;
            if let Some(task) = self.tasks.remove(&name) {
                task.ctx.atexit.borrow_mut().run_all(&name).await;
                match task.join.await {
                    Ok(Ok(())) => tracing::info!(strategy = %name, "strategy completed cleanly"),
                    Ok(Err(err)) => {
                        tracing::error!(strategy = %name, error = %err, "strategy failed and will be restarted");
                        failed = true;
                    }
                    Err(join_err) => {
                        tracing::error!(strategy = %name, error = %join_err, "strategy panicked and will be restarted");
                        failed = true;
                    }
                }
            }
            self.strategies.remove(&name);
            if failed {
                metrics::metrics().record_restart(&name);
                if let Err(err) = self.spawn_strategy(&name).await {
                    tracing::error!(strategy = %name, error = %err, "failed to restart strategy");
                }
            }
        }
    }

    /// Shutdown (spec.md §4.H): runs every live strategy's atexit handlers
    /// as a detached task, waiting at most `shutdown_deadline` for them to
    /// finish. A handler still running past the deadline keeps running —
    /// `clear_strategies` simply stops waiting for it.
    pub async fn clear_strategies(&mut self) {
        let handles: Vec<JoinHandle<()>> = self
            .strategies
            .values()
            .map(|ctx| {
                let ctx = ctx.clone();
                tokio::task::spawn_local(async move {
                    ctx.atexit.borrow_mut().run_all(&ctx.name).await;
                })
            })
            .collect();

        let outcome = tokio::time::timeout(self.shutdown_deadline, futures::future::join_all(handles)).await;
        if outcome.is_err() {
            tracing::warn!(
                deadline_ms = self.shutdown_deadline.as_millis() as u64,
                "clear_strategies hit its deadline with strategies still shutting down"
            );
        }
    }
}

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use host::{Event, Host};
use tokio::sync::oneshot;

use crate::atexit::{AtexitKey, AtexitRegistry};
use crate::router::RouterState;
use crate::timer::Timer;
use crate::want::PendingWant;

/// Everything one running strategy owns, threaded explicitly into every
/// component that needs it instead of being looked up through a global
/// "current strategy" pointer — the router, timer and atexit registry all
/// take a `&Rc<StrategyCtx>` rather than reaching into a shared table
/// themselves. [`crate::store`] still offers a registry keyed by name for
/// the executor itself, which does need to look strategies up by name.
pub struct StrategyCtx {
    pub name: Arc<str>,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) router: RefCell<RouterState>,
    pub(crate) atexit: RefCell<AtexitRegistry>,
    pub(crate) timer: RefCell<Timer>,
    want: RefCell<Option<PendingWant>>,
}

impl StrategyCtx {
    pub fn new(name: impl Into<Arc<str>>, host: Arc<dyn Host>) -> Self {
        Self {
            name: name.into(),
            host,
            router: RefCell::new(RouterState::default()),
            atexit: RefCell::new(AtexitRegistry::new()),
            timer: RefCell::new(Timer::new()),
            want: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> { &self.host }

    /// Registers `want` as this strategy's resumption condition and
    /// suspends until the executor's dispatch loop finds a matching event
    /// (spec.md §4.B). Only one want may be outstanding per strategy; a
    /// second call before the first resumes would silently replace it,
    /// which is always a caller bug, so it is not guarded against here —
    /// the router and send helper each only ever hold one at a time.
    pub(crate) async fn yield_want<T: 'static>(
        &self,
        want: impl Fn(&Event) -> Option<T> + 'static,
    ) -> T {
        let (tx, rx) = oneshot::channel::<Box<dyn Any>>();
        *self.want.borrow_mut() = Some(PendingWant::new(want, tx));
        let boxed = rx.await.expect("want resumed without a value; executor bug");
        *boxed.downcast::<T>().expect("want resumed with the wrong type; impossible for a single call site")
    }

    /// Called by the executor for every event, for every live strategy.
    /// Returns whether this strategy was the one the event resumed.
    pub(crate) fn try_resume(&self, event: &Event) -> bool {
        let Some(pending) = self.want.borrow_mut().take() else {
            return false;
        };
        match pending.try_resume(event) {
            Ok(()) => true,
            Err(still_pending) => {
                *self.want.borrow_mut() = Some(still_pending);
                false
            }
        }
    }

    pub fn is_suspended(&self) -> bool { self.want.borrow().is_some() }

    /// Registers a cleanup handler run on strategy termination (spec.md
    /// §4.F): clean end, error before restart, or executor shutdown.
    pub fn atexit<F, Fut>(&self, handler: F) -> AtexitKey
    where
        F: FnOnce() -> Fut + 'static,
        Fut: std::future::Future<Output = anyhow::Result<()>> + 'static,
    {
        self.atexit.borrow_mut().add(handler)
    }

    /// Removes a previously registered atexit handler; a no-op if `key`
    /// has already run or was never registered.
    pub fn remove_atexit(&self, key: AtexitKey) { self.atexit.borrow_mut().remove(key) }
}

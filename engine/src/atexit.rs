use std::future::Future;
use std::pin::Pin;

pub type AtexitKey = u64;
type AtexitFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;
type BoxedAtexit = Box<dyn FnOnce() -> AtexitFuture>;

/// Per-strategy cleanup handlers (spec.md §4.F), run in registration order
/// on shutdown. A handler may itself suspend indefinitely — the executor's
/// `clear_strategies` bounds the *wait*, not the handler's own lifetime.
#[derive(Default)]
pub struct AtexitRegistry {
    next_key: AtexitKey,
    handlers: Vec<(AtexitKey, BoxedAtexit)>,
}

impl AtexitRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn add<F, Fut>(&mut self, handler: F) -> AtexitKey
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let key = self.next_key;
        self.next_key += 1;
        self.handlers.push((key, Box::new(move || Box::pin(handler()))));
        key
    }

    pub fn remove(&mut self, key: AtexitKey) {
        self.handlers.retain(|(k, _)| *k != key);
    }

    /// Runs every registered handler to completion, in order, logging (but
    /// not propagating) a handler's own failure.
    pub async fn run_all(&mut self, strategy: &str) {
        for (_, handler) in self.handlers.drain(..) {
            if let Err(err) = handler().await {
                tracing::error!(strategy, %err, "atexit handler failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[tokio::test]
    async fn handlers_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut reg = AtexitRegistry::new();
        let o1 = order.clone();
        reg.add(move || {
            let o = o1.clone();
            async move {
                o.borrow_mut().push(1);
                Ok(())
            }
        });
        let o2 = order.clone();
        reg.add(move || {
            let o = o2.clone();
            async move {
                o.borrow_mut().push(2);
                Ok(())
            }
        });
        reg.run_all("demo").await;
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn a_removed_handler_never_runs() {
        let ran = Rc::new(RefCell::new(false));
        let mut reg = AtexitRegistry::new();
        let flag = ran.clone();
        let key = reg.add(move || {
            let flag = flag.clone();
            async move {
                *flag.borrow_mut() = true;
                Ok(())
            }
        });
        reg.remove(key);
        reg.run_all("demo").await;
        assert!(!*ran.borrow());
    }
}

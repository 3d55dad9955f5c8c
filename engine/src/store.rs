use std::rc::Rc;

use crate::ctx::StrategyCtx;

/// The executor's registry of live strategy contexts, keyed by name
/// (spec.md §4.A). A strategy's own code never consults this directly —
/// it only ever sees the `Rc<StrategyCtx>` the executor handed it at
/// spawn time, per the REDESIGN FLAGS note preferring explicit context
/// over a globally-consulted "current strategy" pointer. `StrategyStore`
/// exists for the one place that genuinely needs name-based lookup: the
/// executor's dispatch and restart bookkeeping.
#[derive(Default)]
pub struct StrategyStore {
    strategies: std::collections::HashMap<String, Rc<StrategyCtx>>,
}

impl StrategyStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, ctx: Rc<StrategyCtx>) { self.strategies.insert(ctx.name.to_string(), ctx); }

    pub fn get(&self, name: &str) -> Option<Rc<StrategyCtx>> { self.strategies.get(name).cloned() }

    pub fn remove(&mut self, name: &str) -> Option<Rc<StrategyCtx>> { self.strategies.remove(name) }

    pub fn names(&self) -> Vec<String> { self.strategies.keys().cloned().collect() }

    pub fn values(&self) -> impl Iterator<Item = &Rc<StrategyCtx>> { self.strategies.values() }

    pub fn len(&self) -> usize { self.strategies.len() }

    pub fn is_empty(&self) -> bool { self.strategies.is_empty() }
}

//! The strategy scheduler, subscription/polling fabric, per-strategy
//! router, suspension protocol and atexit registry (spec.md §2).
//!
//! [`Executor`] drains a [`host::Host`]'s event stream and dispatches into
//! strategy tasks; each task is handed a [`StrategyCtx`] it uses to
//! `register` subscriptions, run its main loop via `on`, issue on-demand
//! requests via `send`, and register cleanup via `atexit`.

#[macro_use]
extern crate lazy_static;

pub mod atexit;
pub mod ctx;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod router;
pub mod send;
pub mod store;
pub mod subscription;
pub mod timer;
mod want;

pub use atexit::AtexitKey;
pub use ctx::StrategyCtx;
pub use error::{Error, ExecutorError, RouterError, TransportError, TransportErrorKind};
pub use executor::{Executor, StrategyBody, StrategyRegistry, SHUTDOWN_DEADLINE};
pub use router::{exit, ResultsTable, UserCallbackOutcome};
pub use store::StrategyStore;
pub use subscription::{Extractor, Fingerprint, SubscriptionId};
pub use timer::Timer;

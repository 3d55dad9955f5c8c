use thiserror::Error;

use host::event::Signal;

/// Errors raised by the strategy-local store, the suspension protocol and
/// the atexit registry — the bookkeeping a strategy body leans on, as
/// opposed to the router/executor errors below which travel per-event.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no strategy is currently executing on this task")]
    NoCurrentStrategy,
    #[error("coroutine wants nothing: attempted to resume a strategy with no pending want")]
    NoWant,
    #[error("timer is not running")]
    TimerNotRunning,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool { std::mem::discriminant(self) == std::mem::discriminant(other) }
}

/// A failed `send()` round-trip (spec.md §4.E/§4.G), carrying enough of the
/// transport response to let a strategy decide whether to retry, not a
/// string a caller has to pattern-match against.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("transport error for {url} (status {status}, kind {kind:?}): {content}")]
pub struct TransportError {
    pub url: String,
    pub status: u16,
    pub content: String,
    pub kind: TransportErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    HttpStatus(u16),
    Network,
    Other,
}

impl TransportErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Self::Network,
            408 | 504 => Self::Timeout,
            s => Self::HttpStatus(s),
        }
    }
}

/// What the per-strategy router loop can fail with. `Exit` is the `exit()`
/// sentinel (spec.md §4.C) and must stay distinguishable by type from an
/// ordinary user callback failure, never by matching on a message string.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("failed to parse payload for \"{fingerprint}\": {source}")]
    ParseFailure { fingerprint: String, #[source] source: anyhow::Error },
    #[error("user callback failed: {0}")]
    UserCallback(#[source] anyhow::Error),
    #[error("exit() called")]
    Exit,
}

/// What the executor's main loop, startup and shutdown can fail with.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("strategy \"{0}\" failed during startup")]
    StartupError(String),
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
    /// Named for parity with spec.md §7's error taxonomy: "the host
    /// reported a network error while calling send". `Executor::run`
    /// never constructs this variant directly — a fetcher event carrying
    /// `error: true` is absorbed inline (logged, dispatch skipped for that
    /// event) rather than surfaced as a value the caller has to match on,
    /// since nothing downstream needs to distinguish it from "no event
    /// fired this tick". Kept as a variant so callers matching on
    /// [`ExecutorError`] exhaustively still see it documented.
    #[error("a fetcher event arrived carrying an error and was discarded")]
    NetworkSentinel,
    #[error("interrupted by {0:?}")]
    Interrupt(Signal),
}

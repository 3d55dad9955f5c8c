/// The six levels spec.md §6 asks the host to provide log sinks for.
/// `tracing` only has five; `Notice` covers both "notice" and
/// "emergency" at the wire level, carried as a `severity` field on the
/// emitted `tracing::error!` event rather than as a native level the
/// underlying subscriber doesn't have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Notice,
}

/// Emit at `Level::Notice` ("notice"/"emergency" in spec.md §6's sink
/// list) through `tracing::error!`, tagged so it can be told apart from
/// an ordinary error in a log query. Expands at the call site, so the
/// caller's own crate (not `host`) must depend on `tracing`.
#[macro_export]
macro_rules! notice {
    ($($arg:tt)*) => {
        tracing::error!(severity = "notice", $($arg)*)
    };
}

#[macro_export]
macro_rules! emergency {
    ($($arg:tt)*) => {
        tracing::error!(severity = "emergency", $($arg)*)
    };
}

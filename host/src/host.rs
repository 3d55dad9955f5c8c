use rust_decimal::Decimal;

use crate::error::Result;
use crate::event::{Event, Token};
use crate::level::Level;
use crate::request::Request;

/// The platform capabilities the engine consumes (spec.md §6). A concrete
/// implementation owns the real HTTP transport, authentication/signing,
/// retry-on-transport-error and rate limiting; none of that is the
/// engine's concern.
#[async_trait::async_trait]
pub trait Host: Send + Sync {
    /// Request periodic polling of `request` every `period_ms`.
    async fn subscribe(&self, request: Request, period_ms: u64) -> Result<()>;

    /// Fire an on-demand request; the response arrives later as a
    /// [`Event::SendResponse`] carrying the returned token.
    async fn send(&self, request: Request) -> Result<Token>;

    /// Blocking (from the executor's point of view) iterator producing
    /// the next event, or `None` once the stream is exhausted.
    async fn next_event(&self) -> Option<Event>;

    /// Discover the strategies to load at startup.
    fn list_strategies(&self) -> Vec<String>;

    /// Structured log sink at one of the six levels (spec.md §6).
    fn log(&self, level: Level, target: &str, message: &str);

    /// Millisecond clock, `Decimal`-denominated per the platform's house
    /// numeric convention.
    fn now_ms(&self) -> Decimal;

    /// Reset whatever counters/histograms are scoped to one strategy,
    /// called by the executor right before (re)starting it.
    fn reset_metrics(&self, strategy: &str);

    /// Report one user-callback invocation's timing (spec.md §4.C step 6).
    fn report_timings(&self, strategy: &str, cooperative_ms: Decimal, wall_ms: Decimal);
}

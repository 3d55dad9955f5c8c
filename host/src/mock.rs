use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use rust_decimal::Decimal;
use tokio::sync::Notify;

use crate::error::Result;
use crate::event::{Event, Token};
use crate::level::Level;
use crate::request::Request;
use crate::Host;

/// An in-memory, scripted [`Host`] double. Tests drive it by calling
/// [`MockHost::push_event`] and inspect what the engine did by reading
/// back [`MockHost::sent_requests`] / [`MockHost::subscriptions`] /
/// [`MockHost::logged`].
pub struct MockHost {
    strategies: Vec<String>,
    events: Mutex<VecDeque<Event>>,
    notify: Notify,
    sent: Mutex<Vec<(Token, Request)>>,
    subscriptions: Mutex<Vec<(Request, u64)>>,
    logs: Mutex<Vec<(Level, String, String)>>,
    timings: Mutex<Vec<(String, Decimal, Decimal)>>,
    clock_ms: AtomicI64,
}

impl MockHost {
    pub fn new(strategies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            strategies: strategies.into_iter().map(Into::into).collect(),
            events: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            sent: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            timings: Mutex::new(Vec::new()),
            clock_ms: AtomicI64::new(0),
        }
    }

    /// Enqueue an event for a future `next_event` call to return.
    pub fn push_event(&self, event: Event) {
        self.events.lock().unwrap().push_back(event);
        self.notify.notify_one();
    }

    pub fn sent_requests(&self) -> Vec<(Token, Request)> { self.sent.lock().unwrap().clone() }

    pub fn subscriptions(&self) -> Vec<(Request, u64)> { self.subscriptions.lock().unwrap().clone() }

    pub fn logged(&self) -> Vec<(Level, String, String)> { self.logs.lock().unwrap().clone() }

    pub fn timings(&self) -> Vec<(String, Decimal, Decimal)> { self.timings.lock().unwrap().clone() }

    pub fn set_clock_ms(&self, ms: i64) { self.clock_ms.store(ms, Ordering::SeqCst); }
}

#[async_trait::async_trait]
impl Host for MockHost {
    async fn subscribe(&self, request: Request, period_ms: u64) -> Result<()> {
        self.subscriptions.lock().unwrap().push((request, period_ms));
        Ok(())
    }

    async fn send(&self, request: Request) -> Result<Token> {
        let token = Token::new();
        self.sent.lock().unwrap().push((token, request));
        Ok(token)
    }

    async fn next_event(&self) -> Option<Event> {
        loop {
            if let Some(event) = self.events.lock().unwrap().pop_front() {
                return Some(event);
            }
            self.notify.notified().await;
        }
    }

    fn list_strategies(&self) -> Vec<String> { self.strategies.clone() }

    fn log(&self, level: Level, target: &str, message: &str) {
        self.logs.lock().unwrap().push((level, target.to_string(), message.to_string()));
    }

    fn now_ms(&self) -> Decimal { Decimal::from(self.clock_ms.load(Ordering::SeqCst)) }

    fn reset_metrics(&self, _strategy: &str) {}

    fn report_timings(&self, strategy: &str, cooperative_ms: Decimal, wall_ms: Decimal) {
        self.timings.lock().unwrap().push((strategy.to_string(), cooperative_ms, wall_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_event_returns_pushed_events_in_order() {
        let host = MockHost::new(["demo"]);
        host.push_event(Event::Signal(crate::event::Signal::Terminate));
        let ev = host.next_event().await;
        assert_eq!(ev, Some(Event::Signal(crate::event::Signal::Terminate)));
    }

    #[tokio::test]
    async fn send_records_the_request_and_returns_a_unique_token() {
        let host = MockHost::new(["demo"]);
        let t1 = host.send(Request::get("https://x")).await.unwrap();
        let t2 = host.send(Request::get("https://y")).await.unwrap();
        assert_ne!(t1, t2);
        assert_eq!(host.sent_requests().len(), 2);
    }
}

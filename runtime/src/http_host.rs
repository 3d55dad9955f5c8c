use std::time::Duration;

use host::event::{ResponsePayload, Signal};
use host::{Event, Host, Level, Method, Request, Result, Token};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, Mutex};

/// The concrete [`Host`] a real deployment runs: `reqwest` over the wire,
/// one polling task per subscription, signal handling for `Terminate`, all
/// funneled into one event channel the executor drains (spec.md §6). Mirrors
/// `BitstampApi`'s `reqwest::Client` + plain-async-fn-per-call shape, with
/// polling added on top since the platform's adapters were called
/// synchronously from a strategy loop rather than subscribed to.
pub struct HttpHost {
    client: reqwest::Client,
    strategies: Vec<String>,
    tx: mpsc::UnboundedSender<Event>,
    rx: Mutex<mpsc::UnboundedReceiver<Event>>,
}

impl HttpHost {
    pub fn new(strategies: Vec<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self { client: reqwest::Client::new(), strategies, tx, rx: Mutex::new(rx) };
        host.spawn_signal_listener();
        host
    }

    /// Pushes `Event::Signal(Signal::Terminate)` on Ctrl-C or (on unix)
    /// SIGTERM, exactly once — either ends `Executor::run`'s loop.
    fn spawn_signal_listener(&self) {
        let tx = self.tx.clone();
        tokio::task::spawn_local(async move {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(sig) => sig,
                    Err(err) => {
                        tracing::warn!(%err, "failed to install SIGTERM handler");
                        let _ = tokio::signal::ctrl_c().await;
                        let _ = tx.send(Event::Signal(Signal::Terminate));
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
            let _ = tx.send(Event::Signal(Signal::Terminate));
        });
    }

    async fn perform(client: reqwest::Client, request: Request) -> ResponsePayload {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
            Method::Put => reqwest::Method::PUT,
        };
        if request.sign.is_some() {
            tracing::warn!(url = %request.url, "request asked for signing, which this demo host does not implement");
        }

        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let error = !response.status().is_success();
                let content = response.text().await.unwrap_or_default();
                ResponsePayload {
                    url: request.url,
                    env_suffix: request.env_suffix,
                    status,
                    content,
                    error,
                    restart: false,
                    terminate: false,
                }
            }
            Err(err) => ResponsePayload {
                url: request.url,
                env_suffix: request.env_suffix,
                status: 0,
                content: err.to_string(),
                error: true,
                restart: false,
                terminate: false,
            },
        }
    }
}

fn decimal_to_f64(d: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    d.to_f64().unwrap_or(0.0)
}

#[async_trait::async_trait]
impl Host for HttpHost {
    async fn subscribe(&self, request: Request, period_ms: u64) -> Result<()> {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(period_ms.max(1)));
            loop {
                ticker.tick().await;
                let payload = HttpHost::perform(client.clone(), request.clone()).await;
                if tx.send(Event::from_fetcher_payload(payload)).is_err() {
                    return;
                }
            }
        });
        Ok(())
    }

    async fn send(&self, request: Request) -> Result<Token> {
        let token = Token::new();
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::task::spawn_local(async move {
            let payload = HttpHost::perform(client, request).await;
            let _ = tx.send(Event::from_send_response(token, payload));
        });
        Ok(token)
    }

    async fn next_event(&self) -> Option<Event> { self.rx.lock().await.recv().await }

    fn list_strategies(&self) -> Vec<String> { self.strategies.clone() }

    fn log(&self, level: Level, target: &str, message: &str) {
        match level {
            Level::Trace => tracing::trace!(target = target, "{message}"),
            Level::Debug => tracing::debug!(target = target, "{message}"),
            Level::Info => tracing::info!(target = target, "{message}"),
            Level::Warn => tracing::warn!(target = target, "{message}"),
            Level::Error => tracing::error!(target = target, "{message}"),
            Level::Notice => host::notice!(target = target, "{message}"),
        }
    }

    fn now_ms(&self) -> Decimal { Decimal::from(chrono::Utc::now().timestamp_millis()) }

    fn reset_metrics(&self, strategy: &str) {
        tracing::debug!(strategy, "metrics reset");
        engine::metrics::metrics().reset(strategy);
    }

    fn report_timings(&self, strategy: &str, cooperative_ms: Decimal, wall_ms: Decimal) {
        tracing::debug!(strategy, %cooperative_ms, %wall_ms, "callback timing reported");
        engine::metrics::metrics().observe_timings(
            strategy,
            decimal_to_f64(cooperative_ms),
            decimal_to_f64(wall_ms),
        );
    }
}

use std::collections::HashMap;

use prometheus::{histogram_opts, labels, opts, register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

pub const CALLBACK_DURATION_BUCKETS: &[f64; 9] = &[1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0, 5000.0];

#[derive(Clone)]
pub struct ExecutorMetrics {
    cooperative_ms: HistogramVec,
    wall_ms: HistogramVec,
    restarts: CounterVec,
}

impl ExecutorMetrics {
    fn new() -> Self {
        let const_labels: HashMap<&str, &str> = labels! {};
        let strategy_label = &["strategy"];
        Self {
            cooperative_ms: register_histogram_vec!(
                histogram_opts!(
                    "strategy_callback_cooperative_ms",
                    "cooperative time spent in one strategy callback invocation",
                    CALLBACK_DURATION_BUCKETS.to_vec()
                ),
                strategy_label
            )
            .unwrap(),
            wall_ms: register_histogram_vec!(
                histogram_opts!(
                    "strategy_callback_wall_ms",
                    "wall time spent in one strategy callback invocation",
                    CALLBACK_DURATION_BUCKETS.to_vec()
                ),
                strategy_label
            )
            .unwrap(),
            restarts: register_counter_vec!(
                opts!("strategy_restarts", "restarts performed by the executor's dead-task sweep", const_labels),
                strategy_label
            )
            .unwrap(),
        }
    }

    pub fn observe_timings(&self, strategy: &str, cooperative_ms: f64, wall_ms: f64) {
        self.cooperative_ms.with_label_values(&[strategy]).observe(cooperative_ms);
        self.wall_ms.with_label_values(&[strategy]).observe(wall_ms);
    }

    pub fn record_restart(&self, strategy: &str) { self.restarts.with_label_values(&[strategy]).inc() }

    /// Drops `strategy`'s accumulated series, called by the executor right
    /// before (re)starting it so a restarted strategy's timing histogram
    /// doesn't carry over samples from its previous, now-dead incarnation.
    pub fn reset(&self, strategy: &str) {
        let _ = self.cooperative_ms.remove_label_values(&[strategy]);
        let _ = self.wall_ms.remove_label_values(&[strategy]);
    }
}

lazy_static! {
    static ref EXECUTOR_METRICS: ExecutorMetrics = ExecutorMetrics::new();
}

pub fn metrics() -> &'static ExecutorMetrics {
    lazy_static::initialize(&EXECUTOR_METRICS);
    &EXECUTOR_METRICS
}

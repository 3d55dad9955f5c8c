use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::error::Error;

/// Cooperative/wall stopwatch a router pauses around blocking `send()`
/// calls so a user callback's own compute time is measured separately from
/// time spent waiting on the host (spec.md §4.D/§4.G).
#[derive(Debug)]
pub struct Timer {
    state: TimerState,
    cooperative: Duration,
    running_since: Option<Instant>,
    wall_start: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Stopped,
    Started,
    Paused,
}

impl Default for Timer {
    fn default() -> Self {
        Self { state: TimerState::Stopped, cooperative: Duration::ZERO, running_since: None, wall_start: None }
    }
}

impl Timer {
    pub fn new() -> Self { Self::default() }

    /// Resets the cooperative accumulator and records the wall start.
    pub fn start(&mut self) {
        self.cooperative = Duration::ZERO;
        let now = Instant::now();
        self.running_since = Some(now);
        self.wall_start = Some(now);
        self.state = TimerState::Started;
    }

    /// No-op unless currently started — called around a `send()` await so
    /// the wait doesn't count against the cooperative budget.
    pub fn pause(&mut self) {
        if self.state != TimerState::Started {
            return;
        }
        if let Some(since) = self.running_since.take() {
            self.cooperative += since.elapsed();
        }
        self.state = TimerState::Paused;
    }

    /// No-op unless currently paused.
    pub fn resume(&mut self) {
        if self.state != TimerState::Paused {
            return;
        }
        self.running_since = Some(Instant::now());
        self.state = TimerState::Started;
    }

    /// Returns `(cooperative_ms, wall_ms)`. An error to call while already
    /// stopped.
    pub fn stop(&mut self) -> Result<(Decimal, Decimal), Error> {
        if self.state == TimerState::Stopped {
            return Err(Error::TimerNotRunning);
        }
        if self.state == TimerState::Started {
            if let Some(since) = self.running_since.take() {
                self.cooperative += since.elapsed();
            }
        }
        let wall = self.wall_start.take().map(|w| w.elapsed()).unwrap_or_default();
        self.state = TimerState::Stopped;
        Ok((duration_to_ms(self.cooperative), duration_to_ms(wall)))
    }
}

fn duration_to_ms(d: Duration) -> Decimal {
    Decimal::from(d.as_micros() as i64) / Decimal::from(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_without_start_is_an_error() {
        let mut t = Timer::new();
        assert_eq!(t.stop(), Err(Error::TimerNotRunning));
    }

    #[test]
    fn pause_excludes_time_from_the_cooperative_total() {
        let mut t = Timer::new();
        t.start();
        std::thread::sleep(Duration::from_millis(5));
        t.pause();
        std::thread::sleep(Duration::from_millis(50));
        t.resume();
        std::thread::sleep(Duration::from_millis(5));
        let (coop, wall) = t.stop().unwrap();
        assert!(coop < Decimal::from(40), "cooperative time leaked the paused interval: {coop}");
        assert!(wall >= Decimal::from(55), "wall time should include the paused interval: {wall}");
    }
}

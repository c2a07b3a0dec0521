use std::time::{Duration, Instant};

/// Hooks the harness uses to exclude setup work from the measurement.
pub trait TimingGate {
    fn pause_timing(&mut self);
    fn resume_timing(&mut self);
}

/// Accumulates wall time between `resume_timing` and `pause_timing`.
///
/// A fresh stopwatch is running, matching a runner that starts timing each iteration
/// implicitly.
#[derive(Debug)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    pub fn started() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: Some(Instant::now()),
        }
    }

    pub fn paused() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated
            + self
                .running_since
                .map(|since| since.elapsed())
                .unwrap_or_default()
    }

    /// Stops the clock and reports the measured time.
    pub fn finish(mut self) -> Duration {
        self.pause_timing();
        self.accumulated
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::started()
    }
}

impl TimingGate for Stopwatch {
    fn pause_timing(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    fn resume_timing(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }
}

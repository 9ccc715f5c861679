//! Frame timing primitives.
//!
//! [`FrameTimers`] implements the Begin/End bracketing protocol: the CPU
//! stopwatch runs between `begin` and `end`, the GPU stopwatch runs between
//! `end` and the next `begin`. The GPU figure is therefore the wall-clock gap
//! in which the host presents and waits on the GPU, an estimate rather than a
//! timestamp query.
//!
//! Every operation has an `_at` variant taking the current instant so the
//! protocol can be driven deterministically.

use std::time::{Duration, Instant};

/// Restartable stopwatch accumulating running time.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    /// A stopped stopwatch with zero elapsed time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset elapsed time to zero and start running at `now`.
    pub fn restart_at(&mut self, now: Instant) {
        self.elapsed = Duration::ZERO;
        self.started = Some(now);
    }

    /// Stop at `now`, folding the running interval into the elapsed time.
    pub fn stop_at(&mut self, now: Instant) {
        if let Some(started) = self.started.take() {
            self.elapsed += now.saturating_duration_since(started);
        }
    }

    /// Elapsed time as seen at `now`.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.started {
            Some(started) => self.elapsed + now.saturating_duration_since(started),
            None => self.elapsed,
        }
    }

    pub fn restart(&mut self) {
        self.restart_at(Instant::now());
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

/// CPU and GPU durations of one bracketed frame, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    pub cpu_ms: f32,
    pub gpu_ms: f32,
}

/// CPU/GPU stopwatch pair driven by `begin`/`end`.
#[derive(Debug, Clone, Default)]
pub struct FrameTimers {
    cpu: Stopwatch,
    gpu: Stopwatch,
}

impl FrameTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring CPU work and stop the GPU gap measurement.
    pub fn begin_at(&mut self, now: Instant) {
        self.cpu.restart_at(now);
        self.gpu.stop_at(now);
    }

    /// Close the frame and start measuring the GPU gap again.
    pub fn end_at(&mut self, now: Instant) -> FrameTiming {
        self.cpu.stop_at(now);
        let timing = FrameTiming {
            cpu_ms: duration_ms(self.cpu.elapsed_at(now)),
            gpu_ms: duration_ms(self.gpu.elapsed_at(now)),
        };
        self.gpu.restart_at(now);
        timing
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn end(&mut self) -> FrameTiming {
        self.end_at(Instant::now())
    }
}

/// Gate that opens once per interval.
#[derive(Debug, Clone)]
pub struct RateGate {
    interval: Duration,
    last: Instant,
}

impl RateGate {
    /// Gate whose first opening is `interval` after `start`.
    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// True when more than `interval` passed since the last reset.
    pub fn is_open_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) > self.interval
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn duration_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}

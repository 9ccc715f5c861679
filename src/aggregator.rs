//! Conversion of a raw, possibly per-frame value stream into display samples.
//!
//! Values are either stored one-to-one ([`SampleMode::EachValue`]) or averaged
//! over a tick-count or wall-clock window. When warm-up suppression is on, the
//! first completed window is dropped: on the first frames a measurement
//! usually includes one-time setup cost and would dominate the chart scale.

use std::time::Instant;

use bevy::log::debug;

use crate::config::SampleMode;

/// Accumulator turning pushed values into emitted samples.
#[derive(Debug, Clone)]
pub struct SampleAggregator {
    mode: SampleMode,
    sum: f64,
    count: u32,
    window_start: Instant,
    warmup_pending: bool,
    latest: f32,
}

impl SampleAggregator {
    /// Create an aggregator whose first window starts now.
    pub fn new(mode: SampleMode, skip_warmup: bool) -> Self {
        Self::starting_at(mode, skip_warmup, Instant::now())
    }

    /// Create an aggregator whose first window starts at `start`.
    pub fn starting_at(mode: SampleMode, skip_warmup: bool, start: Instant) -> Self {
        Self {
            mode,
            sum: 0.0,
            count: 0,
            window_start: start,
            warmup_pending: skip_warmup,
            latest: 0.0,
        }
    }

    /// Push a raw value, returning the sample to store if one is emitted.
    pub fn push(&mut self, value: f32) -> Option<f32> {
        self.push_at(value, Instant::now())
    }

    /// Push a raw value observed at `now`.
    pub fn push_at(&mut self, value: f32, now: Instant) -> Option<f32> {
        let window_done = match self.mode {
            SampleMode::EachValue => {
                self.latest = value;
                return Some(value);
            }
            SampleMode::Ticks(ticks) => {
                self.accumulate(value);
                self.count >= ticks.max(1)
            }
            SampleMode::TimeWindow(window) => {
                self.accumulate(value);
                now.saturating_duration_since(self.window_start) >= window
            }
        };

        if !window_done {
            return None;
        }

        let average = self.take_average();
        self.window_start = now;

        if self.warmup_pending {
            self.warmup_pending = false;
            debug!("discarding warm-up window (average {average})");
            return None;
        }

        self.latest = average;
        Some(average)
    }

    /// Most recently emitted sample, 0 before the first one.
    pub fn latest(&self) -> f32 {
        self.latest
    }

    pub fn mode(&self) -> SampleMode {
        self.mode
    }

    /// Number of values waiting in the current window.
    pub fn pending(&self) -> u32 {
        self.count
    }

    fn accumulate(&mut self, value: f32) {
        self.sum += f64::from(value);
        self.count += 1;
    }

    fn take_average(&mut self) -> f32 {
        let average = if self.count > 0 {
            (self.sum / f64::from(self.count)) as f32
        } else {
            0.0
        };
        self.sum = 0.0;
        self.count = 0;
        average
    }
}

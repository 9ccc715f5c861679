//! Bounded per-metric sample history.
//!
//! Two eviction disciplines are supported. [`HistoryPolicy::Continuous`] keeps
//! a sliding window of the most recent samples in chronological order, so the
//! chart scrolls. [`HistoryPolicy::Looping`] overwrites a fixed-size array at a
//! rotating cursor and is read in storage order, so the chart "wipes" across
//! the draw area instead.

use std::collections::VecDeque;

/// Eviction policy of a [`HistoryBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Drop the oldest sample once capacity is exceeded
    #[default]
    Continuous,
    /// Overwrite samples in place at a rotating cursor once full
    Looping,
}

/// Fixed-capacity sample storage for one metric.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values: VecDeque<f32>,
    capacity: usize,
    policy: HistoryPolicy,
    /// Next slot to overwrite under [`HistoryPolicy::Looping`]
    cursor: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` samples.
    pub fn new(capacity: usize, policy: HistoryPolicy) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            cursor: 0,
        }
    }

    /// Store a new sample according to the buffer's policy.
    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }

        match self.policy {
            HistoryPolicy::Continuous => {
                self.values.push_back(value);
                while self.values.len() > self.capacity {
                    self.values.pop_front();
                }
            }
            HistoryPolicy::Looping => {
                if self.values.len() < self.capacity {
                    self.values.push_back(value);
                    return;
                }
                self.values[self.cursor] = value;
                self.cursor = (self.cursor + 1) % self.capacity;
            }
        }
    }

    /// Copy of the stored samples in storage order.
    pub fn snapshot(&self) -> Vec<f32> {
        self.values.iter().copied().collect()
    }

    /// Copy the stored samples into `out`, replacing its contents.
    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.values.iter().copied());
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        match self.policy {
            HistoryPolicy::Continuous => self.values.back().copied(),
            HistoryPolicy::Looping => {
                if self.values.len() < self.capacity {
                    self.values.back().copied()
                } else {
                    let idx = (self.cursor + self.capacity - 1) % self.capacity;
                    self.values.get(idx).copied()
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    /// Slot the next looping write will overwrite.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drop every stored sample and rewind the cursor.
    pub fn clear(&mut self) {
        self.values.clear();
        self.cursor = 0;
    }
}

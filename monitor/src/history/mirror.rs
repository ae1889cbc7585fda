use std::collections::VecDeque;
use std::time::Duration;

use super::Sample;
use crate::config::RETENTION;

/// About a week of one-second polling.
pub const MIRROR_CAPACITY: usize = 600_000;

/// In-memory copy of the price history, ordered by time.
///
/// Seeded once from the store and then appended to by the loop only; it is
/// never reloaded. Samples older than the retention horizon (measured from
/// the newest sample) are evicted on push, and the length never exceeds the
/// capacity, oldest first.
pub struct HistoryMirror {
    samples: VecDeque<Sample>,
    retention: Duration,
    capacity: usize,
}

impl Default for HistoryMirror {
    fn default() -> Self {
        Self::new(RETENTION, MIRROR_CAPACITY)
    }
}

impl HistoryMirror {
    pub fn new(retention: Duration, capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            retention,
            capacity: capacity.max(1),
        }
    }

    /// Replaces the contents with samples loaded from the store.
    pub fn seed(&mut self, loaded: Vec<Sample>) {
        self.samples = loaded.into();
        if let Some(newest) = self.samples.back().copied() {
            self.evict(newest);
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        self.evict(sample);
    }

    fn evict(&mut self, newest: Sample) {
        let horizon = crate::time::cutoff(newest.timestamp, self.retention);
        while let Some(front) = self.samples.front() {
            if front.timestamp < horizon || self.samples.len() > self.capacity {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

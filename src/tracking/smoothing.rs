// FingerStateTracker - majority filtering of raw finger observations
//
// Each finger keeps a bounded FIFO of its most recent raw observations.
// The smoothed state is "down" when the fraction of down observations in
// that window exceeds the configured threshold. Histories are allocated
// once at their full capacity and never grow.

use std::collections::VecDeque;

use crate::config::SmoothingConfig;
use crate::tracking::{FingerId, FINGER_COUNT};

/// Rolling window of raw observations for one finger.
#[derive(Debug, Clone)]
pub struct FingerHistory {
    samples: VecDeque<bool>,
    capacity: usize,
}

impl FingerHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an observation, evicting the oldest one at capacity.
    pub fn push(&mut self, down: bool) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(down);
    }

    /// Fraction of "down" observations in the window (0.0 when empty).
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let down = self.samples.iter().filter(|&&sample| sample).count();
        down as f32 / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Smooths raw finger observations independently per finger.
#[derive(Debug, Clone)]
pub struct FingerStateTracker {
    histories: [FingerHistory; FINGER_COUNT],
    threshold: f32,
}

impl FingerStateTracker {
    /// Create a tracker with `window` observations per finger.
    ///
    /// # Arguments
    /// * `window` - History capacity per finger (clamped to at least 1)
    /// * `threshold` - Mean that must be exceeded for a finger to read as down
    pub fn new(window: usize, threshold: f32) -> Self {
        Self {
            histories: std::array::from_fn(|_| FingerHistory::new(window)),
            threshold,
        }
    }

    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(config.window_size, config.threshold)
    }

    /// Feed one raw observation and return the finger's smoothed state.
    pub fn observe(&mut self, finger: FingerId, down: bool) -> bool {
        let history = &mut self.histories[finger.index()];
        history.push(down);
        history.mean() > self.threshold
    }

    /// Feed a full frame of observations in [`FingerId`] order.
    pub fn observe_all(&mut self, raw: [bool; FINGER_COUNT]) -> [bool; FINGER_COUNT] {
        let mut smoothed = [false; FINGER_COUNT];
        for finger in FingerId::ALL {
            smoothed[finger.index()] = self.observe(finger, raw[finger.index()]);
        }
        smoothed
    }

    /// Current smoothed state without recording anything.
    pub fn smoothed(&self, finger: FingerId) -> bool {
        self.histories[finger.index()].mean() > self.threshold
    }

    pub fn history_len(&self, finger: FingerId) -> usize {
        self.histories[finger.index()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_never_exceeds_capacity() {
        let mut history = FingerHistory::new(3);
        for _ in 0..10 {
            history.push(true);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.capacity(), 3);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut history = FingerHistory::new(3);
        history.push(true);
        history.push(false);
        history.push(false);
        assert!((history.mean() - 1.0 / 3.0).abs() < f32::EPSILON);
        history.push(false);
        assert_eq!(history.mean(), 0.0);
    }

    #[test]
    fn converges_after_full_window_of_identical_observations() {
        let mut tracker = FingerStateTracker::new(10, 0.6);
        // Seed with the opposite value first.
        for _ in 0..25 {
            tracker.observe(FingerId::LeftRing, false);
        }
        let mut last = false;
        for _ in 0..10 {
            last = tracker.observe(FingerId::LeftRing, true);
        }
        assert!(last);

        for _ in 0..10 {
            last = tracker.observe(FingerId::LeftRing, false);
        }
        assert!(!last);
    }

    #[test]
    fn threshold_is_strict() {
        let mut tracker = FingerStateTracker::new(10, 0.6);
        for i in 0..10 {
            tracker.observe(FingerId::RightIndex, i >= 4);
        }
        // 6/10 == 0.6 is not above the threshold
        assert!(!tracker.smoothed(FingerId::RightIndex));
        // evicts a false: 7/10
        assert!(tracker.observe(FingerId::RightIndex, true));
    }

    #[test]
    fn single_frame_jitter_is_suppressed() {
        let mut tracker = FingerStateTracker::new(10, 0.6);
        for _ in 0..10 {
            tracker.observe(FingerId::LeftIndex, true);
        }
        assert!(tracker.observe(FingerId::LeftIndex, false));
        assert!(tracker.observe(FingerId::LeftIndex, true));
    }

    #[test]
    fn fingers_are_independent() {
        let mut tracker = FingerStateTracker::new(10, 0.6);
        for _ in 0..10 {
            tracker.observe(FingerId::LeftMiddle, true);
        }
        assert!(tracker.smoothed(FingerId::LeftMiddle));
        assert!(!tracker.smoothed(FingerId::RightMiddle));
        assert_eq!(tracker.history_len(FingerId::RightMiddle), 0);
    }

    #[test]
    fn observe_all_keeps_finger_order() {
        let mut tracker = FingerStateTracker::new(1, 0.6);
        let raw = [true, false, false, true, false, true, false, false];
        assert_eq!(tracker.observe_all(raw), raw);
    }
}

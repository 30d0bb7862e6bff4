//! Test doubles for the audio seam.
//!
//! Compiled into the library so integration tests and the fixture harness
//! can use them; nothing here touches an audio device.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::analysis::Note;
use crate::audio::CueSink;

/// Cue sink that records every trigger in order.
///
/// Notes can be marked unavailable to exercise the missing-asset path.
#[derive(Default)]
pub struct RecordingCueSink {
    triggers: Mutex<Vec<Note>>,
    triggered: Condvar,
    unavailable: Mutex<Vec<Note>>,
}

impl RecordingCueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink reporting no cue for each of `missing`.
    pub fn with_missing(missing: &[Note]) -> Self {
        let sink = Self::new();
        for note in missing {
            sink.set_available(*note, false);
        }
        sink
    }

    pub fn set_available(&self, note: Note, available: bool) {
        let mut unavailable = self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        unavailable.retain(|n| *n != note);
        if !available {
            unavailable.push(note);
        }
    }

    /// Every note triggered so far, oldest first.
    pub fn triggers(&self) -> Vec<Note> {
        self.triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn trigger_count(&self, note: Note) -> usize {
        self.triggers().iter().filter(|n| **n == note).count()
    }

    /// Block until at least `count` triggers were recorded.
    ///
    /// # Returns
    /// `false` if `timeout` expired first
    pub fn wait_for_triggers(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        while triggers.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            triggers = self
                .triggered
                .wait_timeout(triggers, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    pub fn clear(&self) {
        self.triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CueSink for RecordingCueSink {
    fn has_cue(&self, note: Note) -> bool {
        !self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&note)
    }

    fn trigger(&self, note: Note) {
        if !self.has_cue(note) {
            return;
        }
        self.triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(note);
        self.triggered.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn records_triggers_in_order() {
        let sink = RecordingCueSink::new();
        sink.trigger(Note::C4);
        sink.trigger(Note::A4);
        sink.trigger(Note::C4);
        assert_eq!(sink.triggers(), vec![Note::C4, Note::A4, Note::C4]);
        assert_eq!(sink.trigger_count(Note::C4), 2);
    }

    #[test]
    fn missing_notes_are_not_triggered() {
        let sink = RecordingCueSink::with_missing(&[Note::B4]);
        assert!(!sink.has_cue(Note::B4));
        sink.trigger(Note::B4);
        assert!(sink.triggers().is_empty());

        sink.set_available(Note::B4, true);
        assert!(sink.has_cue(Note::B4));
    }

    #[test]
    fn wait_for_triggers_sees_other_threads() {
        let sink = Arc::new(RecordingCueSink::new());
        let writer = Arc::clone(&sink);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            writer.trigger(Note::F4);
        });
        assert!(sink.wait_for_triggers(1, Duration::from_secs(2)));
        handle.join().unwrap();
        assert!(!sink.wait_for_triggers(2, Duration::from_millis(10)));
    }
}

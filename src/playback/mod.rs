//! Note playback: one looping note at a time, with change debounce.
//!
//! The controller is the sole owner of [`PlaybackState`] and of the live
//! [`PlaybackTask`]. Every state change goes through it, so "playing"
//! always means exactly one task is retriggering `current_note`.

pub mod controller;
pub mod events;
pub mod task;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::analysis::Note;

pub use controller::NotePlaybackController;
pub use events::{PlaybackEvent, PlaybackEventKind};
pub use task::{CancelToken, PlaybackTask};

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_note: Option<Note>,
    pub is_playing: bool,
    /// When the playing note last changed; the debounce reference point
    pub last_change: Instant,
}

impl PlaybackState {
    pub fn idle(now: Instant) -> Self {
        Self {
            current_note: None,
            is_playing: false,
            last_change: now,
        }
    }

    /// The note currently sounding, if any.
    pub fn playing_note(&self) -> Option<Note> {
        if self.is_playing {
            self.current_note
        } else {
            None
        }
    }
}

/// Result of a single controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum Transition {
    /// Idle → playing
    Started { note: Note },
    /// Playing one note → playing another
    Changed { from: Note, to: Note },
    /// Same note requested while it is already playing
    Held { note: Note },
    /// Change arrived inside the debounce window and was dropped
    Suppressed {
        requested: Note,
        #[serde(serialize_with = "serialize_millis")]
        since_change: Duration,
    },
    /// Playing → idle
    Stopped { note: Note },
    /// Nothing to do
    Unchanged,
    /// No cue for the note; playback left as it was
    AssetMissing { note: Note },
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

//! Playback lifecycle events published to UI and CLI subscribers.

use serde::{Deserialize, Serialize};

use crate::analysis::Note;

/// What happened to playback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlaybackEventKind {
    NoteStarted { note: Note, task_id: u64 },
    NoteStopped { note: Note, task_id: u64 },
    ChangeSuppressed { requested: Note, since_change_ms: u64 },
    AssetMissing { note: Note },
}

/// Timestamped playback event; `timestamp_ms` is relative to controller start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackEvent {
    pub timestamp_ms: u64,
    pub kind: PlaybackEventKind,
}

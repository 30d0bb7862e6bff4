// Audio module - note cues, mixing, synthesis, and live output
//
// The playback controller only ever talks to a `CueSink`: "does this note
// have a cue" and "fire it once". Everything behind that seam (sample
// loading, voice mixing, the output device) lives here.

pub mod assets;
pub mod mixer;
#[cfg(feature = "live_audio")]
pub mod output;
pub mod synth;

use crate::analysis::Note;

// Re-export commonly used types for convenience
pub use assets::NoteBank;
pub use mixer::{cue_channel, CueMixer, MixerCueSink, MAX_VOICES};
#[cfg(feature = "live_audio")]
pub use output::CueOutput;

/// Trait implemented by anything that can sound a one-shot note cue.
///
/// Implementations are shared between the session thread (availability
/// checks) and the background playback task (triggers).
pub trait CueSink: Send + Sync {
    /// Whether a cue is loaded for `note`
    fn has_cue(&self, note: Note) -> bool;

    /// Fire the cue for `note` once. A no-op when no cue is loaded.
    fn trigger(&self, note: Note);
}

/// Sink that accepts every note and produces no sound.
///
/// Used by fixture replays, where only the control decisions matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCueSink;

impl CueSink for SilentCueSink {
    fn has_cue(&self, _note: Note) -> bool {
        true
    }

    fn trigger(&self, _note: Note) {}
}

// Virtual Flute Core - gesture-to-note engine
// Hand landmarks in, smoothed fingerings classified to notes, one looping note out

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod playback;
pub mod testing;
pub mod tracking;

// Re-exports for convenience
pub use analysis::{FingeringClassifier, FingeringVector, Note, NOTE_TABLE};
pub use audio::{CueSink, SilentCueSink};
pub use config::AppConfig;
pub use engine::{FluteSession, FrameOutcome, FrameSnapshot, HoleState, SystemTimeSource, TimeSource};
pub use error::{AudioError, ConfigError, ErrorCode};
pub use playback::{NotePlaybackController, PlaybackEvent, PlaybackState, Transition};
pub use tracking::{FingerId, FingerStateTracker, HandFrame, HandLandmarkSet, HandSide};

// Audio error types and constants

use crate::analysis::Note;
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Single source of truth for the numeric codes reported by [`AudioError`].
///
/// Error code range: 1001-1007
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// No cue is loaded for the requested note
    pub const ASSET_MISSING: i32 = 1001;

    /// A note sample could not be read or decoded
    pub const ASSET_LOAD_FAILED: i32 = 1002;

    /// A generated note sample could not be written
    pub const ASSET_WRITE_FAILED: i32 = 1003;

    /// Failed to open audio stream
    pub const STREAM_OPEN_FAILED: i32 = 1004;

    /// Hardware error occurred
    pub const HARDWARE_ERROR: i32 = 1005;

    /// The playback thread could not be spawned
    pub const TASK_SPAWN_FAILED: i32 = 1006;

    /// The playback thread panicked before it was joined
    pub const TASK_PANICKED: i32 = 1007;
}

/// Log an audio error with structured context
///
/// This function logs audio errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=NotePlayback, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio-related errors
///
/// These errors cover note asset handling, the output stream, and the
/// lifecycle of the background playback task.
///
/// Error code ranges: 1001-1007
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No cue is loaded for the requested note
    AssetMissing { note: Note },

    /// A note sample could not be read or decoded
    AssetLoadFailed { path: String, reason: String },

    /// A generated note sample could not be written
    AssetWriteFailed { path: String, reason: String },

    /// Failed to open audio stream
    StreamOpenFailed { reason: String },

    /// Hardware error occurred
    HardwareError { details: String },

    /// The playback thread could not be spawned
    TaskSpawnFailed { note: Note, reason: String },

    /// The playback thread panicked before it was joined
    TaskPanicked { note: Note },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::AssetMissing { .. } => AudioErrorCodes::ASSET_MISSING,
            AudioError::AssetLoadFailed { .. } => AudioErrorCodes::ASSET_LOAD_FAILED,
            AudioError::AssetWriteFailed { .. } => AudioErrorCodes::ASSET_WRITE_FAILED,
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::HardwareError { .. } => AudioErrorCodes::HARDWARE_ERROR,
            AudioError::TaskSpawnFailed { .. } => AudioErrorCodes::TASK_SPAWN_FAILED,
            AudioError::TaskPanicked { .. } => AudioErrorCodes::TASK_PANICKED,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::AssetMissing { note } => {
                format!("No audio cue loaded for note {}", note)
            }
            AudioError::AssetLoadFailed { path, reason } => {
                format!("Failed to load {}: {}", path, reason)
            }
            AudioError::AssetWriteFailed { path, reason } => {
                format!("Failed to write {}: {}", path, reason)
            }
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::HardwareError { details } => {
                format!("Hardware error: {}", details)
            }
            AudioError::TaskSpawnFailed { note, reason } => {
                format!("Failed to spawn playback task for {}: {}", note, reason)
            }
            AudioError::TaskPanicked { note } => {
                format!("Playback task for {} panicked", note)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::HardwareError {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::AssetMissing { note: Note::C4 }.code(),
            AudioErrorCodes::ASSET_MISSING
        );
        assert_eq!(
            AudioError::AssetLoadFailed {
                path: "notes/C4.wav".to_string(),
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::ASSET_LOAD_FAILED
        );
        assert_eq!(
            AudioError::AssetWriteFailed {
                path: "notes/C4.wav".to_string(),
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::ASSET_WRITE_FAILED
        );
        assert_eq!(
            AudioError::StreamOpenFailed {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::STREAM_OPEN_FAILED
        );
        assert_eq!(
            AudioError::HardwareError {
                details: "test".to_string()
            }
            .code(),
            AudioErrorCodes::HARDWARE_ERROR
        );
        assert_eq!(
            AudioError::TaskSpawnFailed {
                note: Note::A4,
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::TASK_SPAWN_FAILED
        );
        assert_eq!(
            AudioError::TaskPanicked { note: Note::A4 }.code(),
            AudioErrorCodes::TASK_PANICKED
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::AssetMissing { note: Note::B4 };
        assert_eq!(err.message(), "No audio cue loaded for note B4");

        let err = AudioError::HardwareError {
            details: "test error".to_string(),
        };
        assert_eq!(err.message(), "Hardware error: test error");

        let err = AudioError::TaskPanicked { note: Note::G4 };
        assert!(err.message().contains("G4"));
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::AssetMissing { note: Note::C5 };
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let audio_err: AudioError = io_err.into();
        match audio_err {
            AudioError::HardwareError { details } => {
                assert!(details.contains("test io error"));
            }
            _ => panic!("Expected HardwareError"),
        }
    }
}

//! Configuration management for session tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! so smoothing, matching, and timing parameters can be tuned without
//! recompilation. Values are consumed once, when a session is built.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Per-finger temporal smoothing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of recent observations kept per finger
    pub window_size: usize,
    /// Mean of the history must exceed this for a finger to read as down
    pub threshold: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            threshold: 0.6,
        }
    }
}

/// Landmark interpretation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Tip-to-MCP distance (normalized units) below which a finger is down
    pub finger_down_distance: f32,
    /// Wrists left of this x coordinate belong to the left hand
    pub left_hand_max_wrist_x: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            finger_down_distance: 0.05,
            left_hand_max_wrist_x: 0.5,
        }
    }
}

/// Fingering classifier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum number of agreeing bits (out of 8) for a match
    pub min_match_score: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { min_match_score: 7 }
    }
}

/// Playback controller timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Minimum time between two accepted note changes
    pub note_change_debounce_ms: u64,
    /// Delay between successive triggers of the active note
    pub retrigger_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            note_change_debounce_ms: 500,
            retrigger_interval_ms: 500,
        }
    }
}

impl PlaybackConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.note_change_debounce_ms)
    }

    pub fn retrigger_interval(&self) -> Duration {
        Duration::from_millis(self.retrigger_interval_ms)
    }
}

/// Display state exported to the overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How long the "now playing" banner stays up after a note change
    pub note_banner_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            note_banner_ms: 2000,
        }
    }
}

/// Note asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory holding `<NOTE>.wav` samples
    pub notes_dir: PathBuf,
    /// Capacity of the trigger queue feeding the output callback
    pub cue_queue_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("notes"),
            cue_queue_capacity: 32,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file doesn't exist
    /// or its JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("assets/flute_config.json")
    }

    /// Check that every value is usable by the pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing.window_size == 0 {
            return Err(ConfigError::InvalidSmoothingWindow {
                window: self.smoothing.window_size,
            });
        }
        // The tracker compares `mean > threshold`, so 1.0 could never read down
        let threshold = self.smoothing.threshold;
        if !(threshold.is_finite() && threshold > 0.0 && threshold < 1.0) {
            return Err(ConfigError::InvalidThreshold {
                name: "smoothing.threshold",
                value: threshold,
            });
        }
        check_positive(
            "tracking.finger_down_distance",
            self.tracking.finger_down_distance,
        )?;
        check_ratio(
            "tracking.left_hand_max_wrist_x",
            self.tracking.left_hand_max_wrist_x,
        )?;
        if usize::from(self.classifier.min_match_score) > crate::tracking::FINGER_COUNT {
            return Err(ConfigError::InvalidMatchScore {
                score: self.classifier.min_match_score,
            });
        }
        if self.playback.retrigger_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval {
                name: "playback.retrigger_interval_ms",
                millis: 0,
            });
        }
        Ok(())
    }
}

fn check_ratio(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

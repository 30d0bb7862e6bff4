//! FluteSession: per-frame gesture-to-note pipeline.
//!
//! One session owns the finger tracker, the fingering classifier, and the
//! playback controller. The capture loop feeds it one [`HandFrame`] per
//! camera frame and renders the returned [`FrameSnapshot`]; it never
//! mutates playback directly.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::analysis::{FingeringClassifier, FingeringVector, Note};
use crate::audio::CueSink;
use crate::config::AppConfig;
use crate::engine::clock::TimeSource;
use crate::error::{log_audio_error, log_config_error, ConfigError, ErrorCode};
use crate::playback::{NotePlaybackController, PlaybackEvent, PlaybackState, Transition};
use crate::tracking::{
    observe_fingers, FingerId, FingerStateTracker, HandFrame, HandLandmarkSet, FINGER_COUNT,
};

/// What the session did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// No hands in frame; playback was forced to stop
    HandsLost(Transition),
    /// Exactly one hand; frame ignored
    PartialHands,
    /// Both hands, but no note scored high enough
    NoMatch,
    /// A note was classified and handed to the controller
    Playback(Transition),
    /// The controller failed to start the note's task
    AudioFault { note: Note, code: i32 },
}

/// Flute overlay state for one hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleState {
    Open,
    Closed,
    /// No note has played yet
    Inactive,
}

/// Read-only view of the session after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub playback: PlaybackState,
    /// Smoothed fingering computed this frame
    pub fingering: Option<FingeringVector>,
    /// Classifier result for `fingering`
    pub candidate: Option<Note>,
    pub outcome: FrameOutcome,
    /// Note to announce while the banner window is open; never set on
    /// frames without hands
    pub banner: Option<Note>,
}

impl FrameSnapshot {
    /// Per-hole display state, from the current note's table pattern.
    pub fn holes(&self) -> [HoleState; FINGER_COUNT] {
        match self.playback.current_note {
            Some(note) => {
                let pattern = note.fingering();
                FingerId::ALL.map(|finger| {
                    if pattern.is_up(finger) {
                        HoleState::Open
                    } else {
                        HoleState::Closed
                    }
                })
            }
            None => [HoleState::Inactive; FINGER_COUNT],
        }
    }
}

/// Gesture-to-note session.
pub struct FluteSession {
    config: AppConfig,
    tracker: FingerStateTracker,
    classifier: FingeringClassifier,
    controller: NotePlaybackController,
    clock: Arc<dyn TimeSource>,
    frames: u64,
}

impl FluteSession {
    /// Validate `config` and build an idle session.
    pub fn new(
        config: AppConfig,
        sink: Arc<dyn CueSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate().map_err(|err| {
            log_config_error(&err, "FluteSession::new");
            err
        })?;

        let tracker = FingerStateTracker::from_config(&config.smoothing);
        let classifier = FingeringClassifier::from_config(&config.classifier);
        let controller =
            NotePlaybackController::new(sink, Arc::clone(&clock), config.playback.clone());

        tracing::info!(
            "[Session] Ready (window {}, threshold {}, min score {}, debounce {} ms)",
            config.smoothing.window_size,
            config.smoothing.threshold,
            config.classifier.min_match_score,
            config.playback.note_change_debounce_ms
        );

        Ok(Self {
            config,
            tracker,
            classifier,
            controller,
            clock,
            frames: 0,
        })
    }

    /// Run one frame through tracking, classification, and playback.
    pub fn process_frame(&mut self, frame: &HandFrame) -> FrameSnapshot {
        self.frames += 1;

        let mut fingering = None;
        let mut candidate = None;
        let outcome = match frame.hand_count() {
            0 => FrameOutcome::HandsLost(self.controller.hands_lost()),
            1 => FrameOutcome::PartialHands,
            _ => match observe_fingers(frame, self.config.tracking.finger_down_distance) {
                Some(raw) => {
                    let down = self.tracker.observe_all(raw);
                    let vector = FingeringVector::from_down_states(down);
                    fingering = Some(vector);
                    candidate = self.classifier.classify(vector);
                    match candidate {
                        Some(note) => self.request(note),
                        None => FrameOutcome::NoMatch,
                    }
                }
                None => FrameOutcome::PartialHands,
            },
        };

        tracing::trace!(
            "[Session] frame {}: {:?} fingering={:?}",
            self.frames,
            outcome,
            fingering.map(|v| v.to_string())
        );

        // Nothing to announce over an empty frame
        let banner = match outcome {
            FrameOutcome::HandsLost(_) => None,
            _ => self.banner(),
        };

        FrameSnapshot {
            playback: self.controller.state(),
            fingering,
            candidate,
            outcome,
            banner,
        }
    }

    /// Assign raw, unsided detections to hands and process them as a frame.
    pub fn process_detections<I>(&mut self, detections: I) -> FrameSnapshot
    where
        I: IntoIterator<Item = HandLandmarkSet>,
    {
        let frame =
            HandFrame::from_detections(detections, self.config.tracking.left_hand_max_wrist_x);
        self.process_frame(&frame)
    }

    fn request(&mut self, note: Note) -> FrameOutcome {
        match self.controller.request(note) {
            Ok(transition) => FrameOutcome::Playback(transition),
            Err(err) => {
                log_audio_error(&err, "process_frame");
                FrameOutcome::AudioFault {
                    note,
                    code: err.code(),
                }
            }
        }
    }

    fn banner(&self) -> Option<Note> {
        let state = self.controller.state();
        let note = state.current_note?;
        let shown = self
            .clock
            .now()
            .saturating_duration_since(state.last_change);
        (shown.as_millis() < u128::from(self.config.display.note_banner_ms)).then_some(note)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.controller.subscribe()
    }

    /// Tracker state, for overlays that show per-finger confidence.
    pub fn tracker(&self) -> &FingerStateTracker {
        &self.tracker
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn live_tasks(&self) -> usize {
        self.controller.live_tasks()
    }

    /// Stop playback. The session stays usable.
    pub fn shutdown(&mut self) {
        if let Some(note) = self.controller.stop() {
            tracing::info!("[Session] Shutdown stopped {}", note);
        }
    }
}

//! Fixture utilities for the deterministic replay harness.
//!
//! A fixture is a JSON frame script: timestamped hand frames (either raw
//! landmark sets or compact finger-up poses) plus optional expectations
//! about playback state at given times. Scripts run through a real
//! `FluteSession` on a manual clock with a silent cue sink, so results
//! depend only on the script and the configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::TryRecvError;

use crate::analysis::{FingeringVector, Note};
use crate::audio::SilentCueSink;
use crate::config::AppConfig;
use crate::engine::{FluteSession, FrameOutcome, FrameSnapshot, HoleState, ManualTimeSource};
use crate::playback::PlaybackEvent;
use crate::tracking::synthetic::hand_from_up_bits;
use crate::tracking::{HandFrame, HandLandmarkSet, HandSide, FINGER_COUNT};

/// Default location for fixture scripts.
pub const DEFAULT_FIXTURE_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Finger-up flags (index, middle, ring, pinky) per hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseSpec {
    #[serde(default)]
    pub left: Option<[u8; 4]>,
    #[serde(default)]
    pub right: Option<[u8; 4]>,
}

/// One scripted camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    pub t_ms: u64,
    /// Raw detections, sided by wrist position; wins over `pose`
    #[serde(default)]
    pub hands: Option<Vec<HandLandmarkSet>>,
    #[serde(default)]
    pub pose: Option<PoseSpec>,
}

impl ScriptFrame {
    /// Build the session input. A frame with neither field has no hands.
    pub fn to_hand_frame(&self, left_max_x: f32) -> HandFrame {
        if let Some(hands) = &self.hands {
            return HandFrame::from_detections(hands.iter().cloned(), left_max_x);
        }
        match self.pose {
            Some(pose) => HandFrame {
                left: pose.left.map(|up| hand_from_up_bits(HandSide::Left, up)),
                right: pose.right.map(|up| hand_from_up_bits(HandSide::Right, up)),
            },
            None => HandFrame::empty(),
        }
    }
}

/// Expected playback state right after the frame at `t_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedState {
    pub t_ms: u64,
    #[serde(default)]
    pub note: Option<Note>,
    pub playing: bool,
}

/// A complete fixture script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameScript {
    pub name: String,
    #[serde(default)]
    pub frames: Vec<ScriptFrame>,
    #[serde(default)]
    pub expect: Vec<ExpectedState>,
}

impl FrameScript {
    pub fn from_json(json: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(json).context("parsing frame script")?;
        script.check_order()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("loading {}", path.display()))
    }

    pub fn expectations(&self) -> Option<Expectations> {
        (!self.expect.is_empty()).then(|| Expectations {
            states: self.expect.clone(),
        })
    }

    fn check_order(&self) -> Result<()> {
        for pair in self.frames.windows(2) {
            if pair[1].t_ms < pair[0].t_ms {
                bail!(
                    "frame timestamps go backwards ({} ms after {} ms)",
                    pair[1].t_ms,
                    pair[0].t_ms
                );
            }
        }
        Ok(())
    }
}

/// Per-frame replay output.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub index: usize,
    pub t_ms: u64,
    pub hands: usize,
    pub fingering: Option<FingeringVector>,
    pub candidate: Option<Note>,
    pub note: Option<Note>,
    pub playing: bool,
    pub banner: Option<Note>,
    pub outcome: FrameOutcome,
    pub holes: [HoleState; FINGER_COUNT],
}

impl FrameReport {
    fn new(index: usize, t_ms: u64, hands: usize, snapshot: &FrameSnapshot) -> Self {
        Self {
            index,
            t_ms,
            hands,
            fingering: snapshot.fingering,
            candidate: snapshot.candidate,
            note: snapshot.playback.current_note,
            playing: snapshot.playback.is_playing,
            banner: snapshot.banner,
            outcome: snapshot.outcome,
            holes: snapshot.holes(),
        }
    }
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureRun {
    pub fixture: String,
    pub frames: Vec<FrameReport>,
    pub events: Vec<PlaybackEvent>,
}

/// Expectation set taken from a script.
#[derive(Debug, Clone)]
pub struct Expectations {
    pub states: Vec<ExpectedState>,
}

impl Expectations {
    /// Compare each expected state with the last frame reported at its time.
    pub fn verify(&self, actual: &[FrameReport]) -> std::result::Result<(), ExpectationDiff> {
        let failures: Vec<ExpectationFailure> = self
            .states
            .iter()
            .enumerate()
            .filter_map(|(index, expected)| {
                let report = actual.iter().rev().find(|r| r.t_ms == expected.t_ms);
                let matches = report
                    .map(|r| r.note == expected.note && r.playing == expected.playing)
                    .unwrap_or(false);
                (!matches).then(|| ExpectationFailure {
                    index,
                    expected: *expected,
                    actual: report.map(|r| (r.note, r.playing)),
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExpectationDiff { failures })
        }
    }
}

/// Outcome of comparing a replay with its expectations.
#[derive(Debug)]
pub struct ExpectationDiff {
    pub failures: Vec<ExpectationFailure>,
}

impl ExpectationDiff {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "failures": self.failures.iter().map(|failure| {
                serde_json::json!({
                    "index": failure.index,
                    "expected": failure.expected,
                    "actual": failure.actual.map(|(note, playing)| {
                        serde_json::json!({ "note": note, "playing": playing })
                    }),
                })
            }).collect::<Vec<_>>()
        })
    }
}

/// A single unmet expectation. `actual` is `None` when no frame had that time.
#[derive(Debug)]
pub struct ExpectationFailure {
    pub index: usize,
    pub expected: ExpectedState,
    pub actual: Option<(Option<Note>, bool)>,
}

/// Catalog responsible for discovering fixture scripts on disk.
pub struct FixtureCatalog {
    root: PathBuf,
}

impl FixtureCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fixture names (file stems of `*.json`), sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !self.root.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load a script by path, or by name from the catalog root.
    pub fn load(&self, fixture: &str) -> Result<FrameScript> {
        FrameScript::load(&self.resolve(fixture)?)
    }

    fn resolve(&self, fixture: &str) -> Result<PathBuf> {
        let as_path = Path::new(fixture);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        let candidate = self.root.join(format!("{fixture}.json"));
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(anyhow!(
                "Fixture '{fixture}' not found in {}",
                self.root.display()
            ))
        }
    }
}

impl Default for FixtureCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_FIXTURE_ROOT)
    }
}

/// Replays scripts through a fresh session per run.
pub struct FixtureProcessor {
    config: AppConfig,
}

impl FixtureProcessor {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, script: &FrameScript) -> Result<FixtureRun> {
        let clock = Arc::new(ManualTimeSource::new());
        let mut session =
            FluteSession::new(self.config.clone(), Arc::new(SilentCueSink), clock.clone())
                .context("building session from config")?;
        let mut rx = session.subscribe();
        let left_max_x = self.config.tracking.left_hand_max_wrist_x;

        let mut frames = Vec::with_capacity(script.frames.len());
        let mut events = Vec::new();
        for (index, scripted) in script.frames.iter().enumerate() {
            clock.set_elapsed(Duration::from_millis(scripted.t_ms));
            let frame = scripted.to_hand_frame(left_max_x);
            let snapshot = session.process_frame(&frame);
            frames.push(FrameReport::new(
                index,
                scripted.t_ms,
                frame.hand_count(),
                &snapshot,
            ));
            drain_events(&mut rx, &mut events);
        }

        session.shutdown();
        drain_events(&mut rx, &mut events);

        tracing::debug!(
            "[Fixtures] {}: {} frames, {} events",
            script.name,
            frames.len(),
            events.len()
        );

        Ok(FixtureRun {
            fixture: script.name.clone(),
            frames,
            events,
        })
    }
}

fn drain_events(
    rx: &mut tokio::sync::broadcast::Receiver<PlaybackEvent>,
    out: &mut Vec<PlaybackEvent>,
) {
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!("[Fixtures] Dropped {} playback events", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{PlaybackEventKind, Transition};

    fn script(json: &str) -> FrameScript {
        FrameScript::from_json(json).unwrap()
    }

    const CLOSED_THEN_OPEN: &str = r#"{
        "name": "closed_then_open",
        "frames": [
            { "t_ms": 0,   "pose": { "left": [0,0,0,0], "right": [0,0,0,0] } },
            { "t_ms": 500, "pose": { "left": [0,0,0,0], "right": [0,0,0,0] } },
            { "t_ms": 600, "pose": { "left": [0,0,0,0] } },
            { "t_ms": 700 }
        ],
        "expect": [
            { "t_ms": 0,   "note": null, "playing": false },
            { "t_ms": 500, "note": "C4", "playing": true },
            { "t_ms": 600, "note": "C4", "playing": true },
            { "t_ms": 700, "note": "C4", "playing": false }
        ]
    }"#;

    #[test]
    fn replay_matches_expectations() {
        let script = script(CLOSED_THEN_OPEN);
        let run = FixtureProcessor::new(AppConfig::default())
            .run(&script)
            .unwrap();

        assert_eq!(run.frames.len(), 4);
        assert_eq!(run.frames[2].hands, 1);
        assert_eq!(run.frames[2].outcome, FrameOutcome::PartialHands);
        assert_eq!(
            run.frames[3].outcome,
            FrameOutcome::HandsLost(Transition::Stopped { note: Note::C4 })
        );
        script.expectations().unwrap().verify(&run.frames).unwrap();

        let kinds: Vec<_> = run.events.iter().map(|e| e.kind).collect();
        assert!(matches!(
            kinds[0],
            PlaybackEventKind::ChangeSuppressed {
                requested: Note::C4,
                since_change_ms: 0,
            }
        ));
        assert!(matches!(
            kinds[1],
            PlaybackEventKind::NoteStarted { note: Note::C4, .. }
        ));
        assert!(matches!(
            kinds[2],
            PlaybackEventKind::NoteStopped { note: Note::C4, .. }
        ));
        assert_eq!(run.events[1].timestamp_ms, 500);
    }

    #[test]
    fn mismatches_are_reported() {
        let mut script = script(CLOSED_THEN_OPEN);
        script.expect = vec![
            ExpectedState {
                t_ms: 500,
                note: Some(Note::D4),
                playing: true,
            },
            ExpectedState {
                t_ms: 9_999,
                note: None,
                playing: false,
            },
        ];
        let run = FixtureProcessor::new(AppConfig::default())
            .run(&script)
            .unwrap();
        let diff = script
            .expectations()
            .unwrap()
            .verify(&run.frames)
            .unwrap_err();

        assert_eq!(diff.failures.len(), 2);
        assert_eq!(diff.failures[0].actual, Some((Some(Note::C4), true)));
        assert_eq!(diff.failures[1].actual, None);

        let json = diff.to_json();
        assert_eq!(json["failures"][0]["expected"]["note"], "D4");
        assert_eq!(json["failures"][0]["actual"]["note"], "C4");
        assert!(json["failures"][1]["actual"].is_null());
    }

    #[test]
    fn raw_hands_are_sided_by_wrist() {
        let left = hand_from_up_bits(HandSide::Left, [0, 0, 0, 0]);
        let right = hand_from_up_bits(HandSide::Right, [1, 1, 1, 1]);
        let frame = ScriptFrame {
            t_ms: 0,
            hands: Some(vec![right.clone(), left.clone()]),
            pose: Some(PoseSpec::default()),
        };
        let hand_frame = frame.to_hand_frame(0.5);
        assert_eq!(hand_frame.left, Some(left));
        assert_eq!(hand_frame.right, Some(right));
    }

    #[test]
    fn backwards_timestamps_are_rejected() {
        let err = FrameScript::from_json(
            r#"{ "name": "bad", "frames": [ { "t_ms": 100 }, { "t_ms": 50 } ] }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("backwards"));
    }

    #[test]
    fn invalid_config_fails_the_run() {
        let mut config = AppConfig::default();
        config.classifier.min_match_score = 9;
        let result = FixtureProcessor::new(config).run(&script(CLOSED_THEN_OPEN));
        assert!(result.is_err());
    }

    #[test]
    fn bundled_fixtures_pass() {
        let catalog = FixtureCatalog::default();
        let names = catalog.discover().unwrap();
        assert!(!names.is_empty());
        for name in names {
            let script = catalog.load(&name).unwrap();
            let run = FixtureProcessor::new(AppConfig::default())
                .run(&script)
                .unwrap();
            if let Some(expectations) = script.expectations() {
                if let Err(diff) = expectations.verify(&run.frames) {
                    panic!("{} failed: {}", name, diff.to_json());
                }
            }
        }
    }
}

// NotePlaybackController - debounced single-note playback state machine
//
// States: Idle (no task) and Playing(note) (one task). Transitions:
//   Idle         --request(n), debounce elapsed-->    Playing(n)
//   Playing(a)   --request(a)-->                      Playing(a)   (held)
//   Playing(a)   --request(b), debounce elapsed-->    Playing(b)   (stop, then start)
//   any          --request(x) inside debounce-->      unchanged    (suppressed, dropped)
//   Playing(a)   --hands_lost-->                      Idle         (ignores debounce)
//
// `last_change` moves only when a new task actually starts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use super::events::{PlaybackEvent, PlaybackEventKind};
use super::task::PlaybackTask;
use super::{PlaybackState, Transition};
use crate::analysis::Note;
use crate::audio::CueSink;
use crate::config::PlaybackConfig;
use crate::engine::clock::TimeSource;
use crate::error::{log_audio_error, AudioError, ErrorCode};

const EVENT_BUFFER: usize = 64;

/// Owns the playback state and the single live playback task.
pub struct NotePlaybackController {
    sink: Arc<dyn CueSink>,
    clock: Arc<dyn TimeSource>,
    config: PlaybackConfig,
    state: PlaybackState,
    task: Option<PlaybackTask>,
    next_task_id: u64,
    live_tasks: Arc<AtomicUsize>,
    origin: Instant,
    events: broadcast::Sender<PlaybackEvent>,
}

impl NotePlaybackController {
    /// Create an idle controller. The debounce window starts now.
    pub fn new(sink: Arc<dyn CueSink>, clock: Arc<dyn TimeSource>, config: PlaybackConfig) -> Self {
        let origin = clock.now();
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            sink,
            clock,
            config,
            state: PlaybackState::idle(origin),
            task: None,
            next_task_id: 1,
            live_tasks: Arc::new(AtomicUsize::new(0)),
            origin,
            events,
        }
    }

    /// Ask for `note` to be the sounding note.
    pub fn request(&mut self, note: Note) -> Result<Transition, AudioError> {
        if self.state.playing_note() == Some(note) {
            return Ok(Transition::Held { note });
        }

        let now = self.clock.now();
        let since_change = now.saturating_duration_since(self.state.last_change);
        if since_change < self.config.debounce() {
            tracing::trace!(
                "[Playback] {} suppressed, {} ms since last change",
                note,
                since_change.as_millis()
            );
            self.publish(
                now,
                PlaybackEventKind::ChangeSuppressed {
                    requested: note,
                    since_change_ms: since_change.as_millis() as u64,
                },
            );
            return Ok(Transition::Suppressed {
                requested: note,
                since_change,
            });
        }

        self.start(note)
    }

    /// Both hands left the frame: stop immediately, regardless of debounce.
    pub fn hands_lost(&mut self) -> Transition {
        match self.stop() {
            Some(note) => Transition::Stopped { note },
            None => Transition::Unchanged,
        }
    }

    /// Replace whatever is playing with a task for `note`.
    ///
    /// A note without a cue leaves the current task running.
    pub fn start(&mut self, note: Note) -> Result<Transition, AudioError> {
        let now = self.clock.now();
        if !self.sink.has_cue(note) {
            let err = AudioError::AssetMissing { note };
            tracing::warn!("[Playback] {}; keeping current state", err.message());
            self.publish(now, PlaybackEventKind::AssetMissing { note });
            return Ok(Transition::AssetMissing { note });
        }

        let previous = self.stop();

        let id = self.next_task_id;
        self.next_task_id += 1;
        let task = PlaybackTask::spawn(
            id,
            note,
            Arc::clone(&self.sink),
            self.config.retrigger_interval(),
            Arc::clone(&self.live_tasks),
        )?;
        self.task = Some(task);

        self.state = PlaybackState {
            current_note: Some(note),
            is_playing: true,
            last_change: now,
        };
        tracing::info!("[Playback] Playing {} (task {})", note, id);
        self.publish(now, PlaybackEventKind::NoteStarted { note, task_id: id });

        Ok(match previous {
            Some(from) => Transition::Changed { from, to: note },
            None => Transition::Started { note },
        })
    }

    /// Cancel and join the live task, if any.
    ///
    /// # Returns
    /// The note that was playing, or `None` when already idle
    pub fn stop(&mut self) -> Option<Note> {
        let task = self.task.take()?;
        let (note, id) = (task.note(), task.id());
        if let Err(err) = task.stop() {
            log_audio_error(&err, "stop");
        }
        self.state.is_playing = false;

        tracing::info!("[Playback] Stopped {} (task {})", note, id);
        let now = self.clock.now();
        self.publish(now, PlaybackEventKind::NoteStopped { note, task_id: id });
        Some(note)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn active_task_id(&self) -> Option<u64> {
        self.task.as_ref().map(PlaybackTask::id)
    }

    /// Task threads currently running, including any still unwinding.
    pub fn live_tasks(&self) -> usize {
        self.live_tasks.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    fn publish(&self, now: Instant, kind: PlaybackEventKind) {
        let event = PlaybackEvent {
            timestamp_ms: now.saturating_duration_since(self.origin).as_millis() as u64,
            kind,
        };
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Drop for NotePlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;

// PlaybackTask - one background thread retriggering a single note
//
// The task owns nothing mutable that the session can see: it holds its
// note, the cue sink, and a cancel token. Stopping is cooperative. The
// token's wait doubles as the inter-trigger sleep, so a cancel wakes the
// task at once instead of after the remaining interval.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::analysis::Note;
use crate::audio::CueSink;
use crate::error::AudioError;

/// Cooperative cancellation signal shared with one playback task.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`, returning early if cancelled.
    ///
    /// # Returns
    /// `true` if the token was cancelled
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, signal) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = signal
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Handle to a running playback task.
pub struct PlaybackTask {
    id: u64,
    note: Note,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl PlaybackTask {
    /// Spawn a task that triggers `note` every `interval` until cancelled.
    ///
    /// `live` is incremented while the task thread runs.
    pub fn spawn(
        id: u64,
        note: Note,
        sink: Arc<dyn CueSink>,
        interval: Duration,
        live: Arc<AtomicUsize>,
    ) -> Result<Self, AudioError> {
        let cancel = CancelToken::new();
        let task_cancel = cancel.clone();

        // Counted before the thread starts so a stop racing the spawn still
        // observes it.
        live.fetch_add(1, Ordering::SeqCst);
        let task_live = Arc::clone(&live);

        let handle = thread::Builder::new()
            .name(format!("cue-{}-{}", note, id))
            .spawn(move || {
                let _guard = LiveGuard(task_live);
                run_task(note, sink.as_ref(), &task_cancel, interval);
            })
            .map_err(|err| {
                live.fetch_sub(1, Ordering::SeqCst);
                AudioError::TaskSpawnFailed {
                    note,
                    reason: err.to_string(),
                }
            })?;

        Ok(Self {
            id,
            note,
            cancel,
            handle,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn note(&self) -> Note {
        self.note
    }

    /// Signal the task and block until its thread has exited.
    pub fn stop(self) -> Result<(), AudioError> {
        self.cancel.cancel();
        self.handle
            .join()
            .map_err(|_| AudioError::TaskPanicked { note: self.note })
    }
}

fn run_task(note: Note, sink: &dyn CueSink, cancel: &CancelToken, interval: Duration) {
    tracing::debug!("[PlaybackTask] {} started", note);
    while !cancel.is_cancelled() {
        sink.trigger(note);
        if cancel.wait_timeout(interval) {
            break;
        }
    }
    tracing::debug!("[PlaybackTask] {} exited", note);
}

/// Decrements the live-task counter when the thread exits, panics included.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingCueSink;
    use std::time::Instant;

    #[test]
    fn cancel_wakes_a_sleeping_wait() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        token.cancel();
        assert!(handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn wait_times_out_without_cancel() {
        let token = CancelToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(5)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn task_triggers_immediately_and_repeats() {
        let sink = Arc::new(RecordingCueSink::new());
        let live = Arc::new(AtomicUsize::new(0));
        let task = PlaybackTask::spawn(
            1,
            Note::E4,
            sink.clone(),
            Duration::from_millis(10),
            Arc::clone(&live),
        )
        .unwrap();

        assert!(sink.wait_for_triggers(3, Duration::from_secs(2)));
        task.stop().unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(sink.triggers().iter().all(|note| *note == Note::E4));
    }

    #[test]
    fn stop_does_not_wait_out_the_interval() {
        let sink = Arc::new(RecordingCueSink::new());
        let live = Arc::new(AtomicUsize::new(0));
        let task = PlaybackTask::spawn(
            7,
            Note::C5,
            sink.clone(),
            Duration::from_secs(30),
            Arc::clone(&live),
        )
        .unwrap();
        assert!(sink.wait_for_triggers(1, Duration::from_secs(2)));

        let started = Instant::now();
        task.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.triggers().len(), 1);
    }

    #[test]
    fn panicking_sink_is_reported_on_stop() {
        struct PanicSink;
        impl CueSink for PanicSink {
            fn has_cue(&self, _note: Note) -> bool {
                true
            }
            fn trigger(&self, _note: Note) {
                panic!("sink failure");
            }
        }

        let live = Arc::new(AtomicUsize::new(0));
        let task = PlaybackTask::spawn(
            2,
            Note::D4,
            Arc::new(PanicSink),
            Duration::from_millis(5),
            Arc::clone(&live),
        )
        .unwrap();

        // The panic unwinds through LiveGuard, so the count drops once the
        // sink has actually run.
        let deadline = Instant::now() + Duration::from_secs(2);
        while live.load(Ordering::SeqCst) != 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(live.load(Ordering::SeqCst), 0);

        assert!(matches!(
            task.stop(),
            Err(AudioError::TaskPanicked { note: Note::D4 })
        ));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}

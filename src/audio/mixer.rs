//! Cue mixing between trigger calls and the audio callback.
//!
//! Triggers arrive on the playback task thread; rendering happens on the
//! real-time audio thread. The two sides share only a lock-free SPSC
//! queue of sample slices. Overlapping cues are summed, so a cue longer
//! than the retrigger interval rings under the next one.

use std::sync::{Arc, Mutex};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::analysis::Note;
use crate::audio::{CueSink, NoteBank};

/// Maximum simultaneously sounding cues; the oldest is dropped beyond this.
pub const MAX_VOICES: usize = 16;

/// Build a connected trigger sink and render-side mixer.
pub fn cue_channel(bank: NoteBank, queue_capacity: usize) -> (MixerCueSink, CueMixer) {
    let (producer, consumer) = RingBuffer::new(queue_capacity.max(1));
    let sink = MixerCueSink {
        bank,
        producer: Mutex::new(producer),
    };
    let mixer = CueMixer {
        incoming: consumer,
        voices: Vec::with_capacity(MAX_VOICES),
    };
    (sink, mixer)
}

/// Trigger side: looks up a note's cue and queues it for the mixer.
pub struct MixerCueSink {
    bank: NoteBank,
    // Only trigger callers contend here, never the audio thread.
    producer: Mutex<Producer<Arc<[f32]>>>,
}

impl MixerCueSink {
    pub fn bank(&self) -> &NoteBank {
        &self.bank
    }
}

impl CueSink for MixerCueSink {
    fn has_cue(&self, note: Note) -> bool {
        self.bank.contains(note)
    }

    fn trigger(&self, note: Note) {
        let Some(cue) = self.bank.get(note) else {
            return;
        };
        let mut producer = match self.producer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if producer.push(cue).is_err() {
            tracing::debug!("[Mixer] Cue queue full, dropping trigger for {}", note);
        }
    }
}

struct Voice {
    samples: Arc<[f32]>,
    position: usize,
}

/// Render side: owned by the audio callback.
pub struct CueMixer {
    incoming: Consumer<Arc<[f32]>>,
    voices: Vec<Voice>,
}

impl CueMixer {
    /// Mix all active cues into an interleaved buffer.
    ///
    /// Every channel of a frame receives the same mono value.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);

        while let Ok(samples) = self.incoming.pop() {
            if self.voices.len() == MAX_VOICES {
                self.voices.remove(0);
            }
            self.voices.push(Voice {
                samples,
                position: 0,
            });
        }

        for frame in data.chunks_mut(channels) {
            let mut value = 0.0_f32;
            for voice in &mut self.voices {
                if let Some(&sample) = voice.samples.get(voice.position) {
                    value += sample;
                    voice.position += 1;
                }
            }
            let value = value.clamp(-1.0, 1.0);
            for out in frame.iter_mut() {
                *out = value;
            }
        }

        self.voices
            .retain(|voice| voice.position < voice.samples.len());
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

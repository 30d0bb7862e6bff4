//! Note sample loading.
//!
//! Cues are read from `<dir>/<NOTE>.wav`, folded to mono, and resampled to
//! the output rate. A note whose file is missing or unreadable is logged
//! once here and simply has no cue; it never fails the session.

use std::path::Path;
use std::sync::Arc;

use crate::analysis::Note;
use crate::error::{AudioError, ErrorCode};

/// Mono, output-rate cues for each note.
#[derive(Debug, Clone)]
pub struct NoteBank {
    cues: [Option<Arc<[f32]>>; 8],
    sample_rate: u32,
}

impl NoteBank {
    /// A bank with no cues loaded.
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            cues: Default::default(),
            sample_rate,
        }
    }

    /// Load every note from `dir`, resampled to `sample_rate`.
    pub fn load_dir<P: AsRef<Path>>(dir: P, sample_rate: u32) -> Self {
        let dir = dir.as_ref();
        let mut bank = Self::empty(sample_rate);

        for note in Note::ALL {
            let path = dir.join(format!("{}.wav", note.name()));
            if !path.exists() {
                log::warn!(
                    "[NoteBank] No sample for {} at {}; note will be silent",
                    note,
                    path.display()
                );
                continue;
            }
            match read_wav(&path) {
                Ok((samples, source_rate)) => {
                    let samples = resample_linear(&samples, source_rate, sample_rate);
                    bank.insert(note, samples);
                }
                Err(err) => {
                    log::warn!(
                        "[NoteBank] Could not load {} (code {}): {}",
                        note,
                        err.code(),
                        err.message()
                    );
                }
            }
        }

        log::info!(
            "[NoteBank] Loaded {}/{} note samples from {}",
            Note::ALL.len() - bank.missing().len(),
            Note::ALL.len(),
            dir.display()
        );
        bank
    }

    pub fn insert(&mut self, note: Note, samples: Vec<f32>) {
        self.cues[note.index()] = Some(Arc::from(samples));
    }

    pub fn get(&self, note: Note) -> Option<Arc<[f32]>> {
        self.cues[note.index()].clone()
    }

    pub fn contains(&self, note: Note) -> bool {
        self.cues[note.index()].is_some()
    }

    /// Notes without a cue, in table order.
    pub fn missing(&self) -> Vec<Note> {
        Note::ALL
            .into_iter()
            .filter(|note| !self.contains(*note))
            .collect()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Read a WAV file as mono f32 samples in [-1, 1].
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let load_err = |reason: String| AudioError::AssetLoadFailed {
        path: path.display().to_string(),
        reason,
    };

    let mut reader =
        hound::WavReader::open(path).map_err(|err| load_err(format!("open failed: {err}")))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(load_err("zero channels".to_string()));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| load_err(err.to_string())))
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|sample| {
                    sample
                        .map(|v| v as f32 / i16::MAX as f32)
                        .map_err(|err| load_err(err.to_string()))
                })
                .collect::<Result<Vec<f32>, _>>()?,
            24 | 32 => {
                let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|v| v as f32 / max)
                            .map_err(|err| load_err(err.to_string()))
                    })
                    .collect::<Result<Vec<f32>, _>>()?
            }
            bits => {
                return Err(load_err(format!("unsupported bits_per_sample={}", bits)));
            }
        },
    };

    if spec.channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let mut mono = Vec::with_capacity(samples.len() / spec.channels as usize);
    for chunk in samples.chunks(spec.channels as usize) {
        let sum: f32 = chunk.iter().copied().sum();
        mono.push(sum / spec.channels as f32);
    }

    Ok((mono, spec.sample_rate))
}

/// Linear-interpolation resampler; adequate for short one-shot cues.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}

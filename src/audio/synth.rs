//! Flute-like note synthesis
//!
//! Generates the default note samples: a sine fundamental with a few
//! harmonics (flutes are strong in odd harmonics) under a simple
//! attack/decay/sustain/release envelope, normalized to full scale.
//! - Pure functions for tone generation
//! - 16-bit mono WAV output via hound

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::Note;
use crate::error::AudioError;

/// Harmonic partials as (multiple of fundamental, amplitude)
const PARTIALS: [(f32, f32); 4] = [(1.0, 0.5), (2.0, 0.2), (3.0, 0.3), (5.0, 0.1)];

/// Envelope shape, as fractions of the tone length
const ATTACK: f32 = 0.05;
const DECAY: f32 = 0.2;
const RELEASE: f32 = 0.1;
const SUSTAIN_LEVEL: f32 = 0.6;

/// Default sample length
pub const DEFAULT_NOTE_DURATION: Duration = Duration::from_millis(500);

/// Generates a flute-like tone peak-normalized to [-1.0, 1.0].
///
/// # Arguments
/// * `frequency` - Fundamental in Hz
/// * `duration` - Tone length
/// * `sample_rate` - Sample rate in Hz (typically 44100)
pub fn flute_tone(frequency: f32, duration: Duration, sample_rate: u32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration.as_secs_f32()) as usize;
    let envelope = adsr_envelope(num_samples);

    let mut tone: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let raw: f32 = PARTIALS
                .iter()
                .map(|&(multiple, amp)| amp * (2.0 * PI * frequency * multiple * t).sin())
                .sum();
            raw * envelope[i]
        })
        .collect();

    let peak = tone.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        for sample in &mut tone {
            *sample /= peak;
        }
    }
    tone
}

/// Linear attack to 1.0, linear decay to the sustain level, flat sustain,
/// and a linear release to zero over the final samples.
fn adsr_envelope(len: usize) -> Vec<f32> {
    let attack = (ATTACK * len as f32) as usize;
    let decay = (DECAY * len as f32) as usize;
    let release = (RELEASE * len as f32) as usize;
    let release_start = len.saturating_sub(release);

    let mut envelope = vec![1.0_f32; len];
    for (i, value) in envelope.iter_mut().enumerate() {
        *value = if i < attack {
            ramp(0.0, 1.0, i, attack)
        } else if i < attack + decay {
            ramp(1.0, SUSTAIN_LEVEL, i - attack, decay)
        } else {
            SUSTAIN_LEVEL
        };
    }
    // release overrides whatever stage it overlaps
    for i in release_start..len {
        envelope[i] = ramp(SUSTAIN_LEVEL, 0.0, i - release_start, release);
    }
    envelope
}

/// `steps` evenly spaced values from `from` to `to` inclusive, sampled at `i`
fn ramp(from: f32, to: f32, i: usize, steps: usize) -> f32 {
    if steps <= 1 {
        return to;
    }
    from + (to - from) * (i as f32 / (steps - 1) as f32)
}

/// Write mono samples as a 16-bit PCM WAV file.
pub fn write_note_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let write_err = |reason: String| AudioError::AssetWriteFailed {
        path: path.display().to_string(),
        reason,
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| write_err(e.to_string()))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.finalize().map_err(|e| write_err(e.to_string()))
}

/// Generate `<NOTE>.wav` for every note into `dir`, creating it if needed.
///
/// # Returns
/// Paths written, in note table order
pub fn generate_note_set(
    dir: &Path,
    sample_rate: u32,
    duration: Duration,
) -> Result<Vec<PathBuf>, AudioError> {
    fs::create_dir_all(dir).map_err(|e| AudioError::AssetWriteFailed {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(Note::ALL.len());
    for note in Note::ALL {
        let path = dir.join(format!("{}.wav", note.name()));
        let tone = flute_tone(note.frequency_hz(), duration, sample_rate);
        write_note_wav(&path, &tone, sample_rate)?;
        log::info!(
            "[Synth] Wrote {} ({:.2} Hz) to {}",
            note,
            note.frequency_hz(),
            path.display()
        );
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::assets::read_wav;

    #[test]
    fn test_tone_length_matches_duration() {
        for &sr in &[22_050, 44_100, 48_000] {
            let tone = flute_tone(440.0, Duration::from_millis(500), sr);
            assert_eq!(tone.len(), sr as usize / 2, "wrong length at {} Hz", sr);
        }
    }

    #[test]
    fn test_tone_is_normalized() {
        let tone = flute_tone(261.63, DEFAULT_NOTE_DURATION, 44_100);
        let peak = tone.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-4, "peak was {}", peak);
    }

    #[test]
    fn test_tone_starts_and_ends_silent() {
        let tone = flute_tone(392.0, DEFAULT_NOTE_DURATION, 44_100);
        assert_eq!(tone[0], 0.0);
        assert!(tone[tone.len() - 1].abs() < 1e-6);
    }

    #[test]
    fn test_envelope_stages() {
        let env = adsr_envelope(1000);
        assert_eq!(env[0], 0.0);
        assert!((env[49] - 1.0).abs() < 1e-6);
        assert!((env[50] - 1.0).abs() < 1e-6);
        assert!((env[500] - SUSTAIN_LEVEL).abs() < 1e-6);
        assert!((env[900] - SUSTAIN_LEVEL).abs() < 1e-6);
        assert_eq!(env[999], 0.0);
    }

    #[test]
    fn test_generate_note_set_writes_every_note() {
        let dir = std::env::temp_dir().join(format!("virtual_flute_synth_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let paths = generate_note_set(&dir, 8_000, Duration::from_millis(100)).unwrap();
        assert_eq!(paths.len(), 8);
        for (note, path) in Note::ALL.iter().zip(&paths) {
            assert!(path.ends_with(format!("{}.wav", note.name())));
            let (samples, rate) = read_wav(path).unwrap();
            assert_eq!(rate, 8_000);
            assert_eq!(samples.len(), 800);
        }

        let _ = fs::remove_dir_all(&dir);
    }
}

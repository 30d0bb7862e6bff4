//! Live note output through the default cpal device.

use std::path::Path;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio::{cue_channel, CueMixer, MixerCueSink, NoteBank};
use crate::error::AudioError;

/// Running output stream. Dropping it silences playback.
pub struct CueOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl CueOutput {
    /// Open the default output device, load note samples at its rate, and
    /// start rendering.
    ///
    /// # Returns
    /// The running output and the sink the playback controller triggers
    pub fn open<P: AsRef<Path>>(
        notes_dir: P,
        queue_capacity: usize,
    ) -> Result<(Self, Arc<MixerCueSink>), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::StreamOpenFailed {
                reason: "No default output device found".to_string(),
            })?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::StreamOpenFailed {
                reason: format!("Failed to get default output config: {:?}", e),
            })?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::StreamOpenFailed {
                reason: "Only F32 sample format is currently supported for output".to_string(),
            });
        }

        let stream_config: cpal::StreamConfig = config.clone().into();
        let sample_rate = stream_config.sample_rate.0;
        let bank = NoteBank::load_dir(notes_dir, sample_rate);
        let (sink, mixer) = cue_channel(bank, queue_capacity);

        let stream = build_stream(&device, &stream_config, mixer)?;
        stream.play().map_err(|e| AudioError::HardwareError {
            details: format!("Output start failed: {}", e),
        })?;

        tracing::info!(
            "[Output] Streaming at {} Hz, {} channel(s)",
            sample_rate,
            stream_config.channels
        );

        Ok((
            Self {
                _stream: stream,
                sample_rate,
            },
            Arc::new(sink),
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: CueMixer,
) -> Result<cpal::Stream, AudioError> {
    let channels_count = config.channels as usize;
    let err_fn = |err| tracing::error!("[Output] Output stream error: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mixer.render(data, channels_count);
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })
}

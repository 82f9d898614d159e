//! Microphone input at the STT sample rate

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig, SupportedStreamConfigRange};

use crate::{Error, Result};

/// Capture rate expected by Whisper (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Microphone stream collecting mono samples into a shared buffer
///
/// Stereo devices are downmixed. The cpal stream is not `Send`, so a capture
/// must stay on the thread that opened it.
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    pending: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

fn supports_rate(range: &SupportedStreamConfigRange, channels: u16) -> bool {
    range.channels() == channels
        && (range.min_sample_rate()..=range.max_sample_rate()).contains(&SampleRate(SAMPLE_RATE))
}

impl AudioCapture {
    /// Open the default input device at 16kHz, mono preferred
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecognitionUnavailable`] if there is no usable input device
    pub fn open() -> Result<Self> {
        let unavailable = |reason: String| Error::RecognitionUnavailable(reason);

        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| unavailable("no microphone found".to_string()))?;

        let ranges: Vec<_> = device
            .supported_input_configs()
            .map_err(|e| unavailable(e.to_string()))?
            .collect();

        let range = [1, 2]
            .into_iter()
            .find_map(|channels| ranges.iter().find(|r| supports_rate(r, channels)))
            .ok_or_else(|| unavailable("microphone cannot record at 16kHz".to_string()))?;

        let config = range.clone().with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            channels = config.channels,
            "microphone opened"
        );

        Ok(Self {
            device,
            config,
            pending: Arc::default(),
            stream: None,
        })
    }

    /// Begin recording; a no-op while already recording
    ///
    /// # Errors
    ///
    /// Returns [`Error::Audio`] if the input stream cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = usize::from(self.config.channels);
        let pending = Arc::clone(&self.pending);
        let on_input = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let Ok(mut pending) = pending.lock() else {
                return;
            };
            if channels == 1 {
                pending.extend_from_slice(data);
            } else {
                #[allow(clippy::cast_precision_loss)]
                let frames = data
                    .chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32);
                pending.extend(frames);
            }
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                on_input,
                |err| tracing::error!(error = %err, "microphone stream error"),
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;
        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Stop recording; samples already collected stay buffered
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("microphone stopped");
        }
    }

    /// Take every sample recorded since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Root-mean-square level of a block, 0.0 for an empty block
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum();
    (energy / samples.len() as f32).sqrt()
}

/// Encode mono samples as a 16-bit PCM WAV upload
///
/// # Errors
///
/// Returns [`Error::Audio`] if encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let encode_err = |e: hound::Error| Error::Audio(format!("WAV encoding failed: {e}"));

    let mut wav = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = hound::WavWriter::new(&mut wav, spec).map_err(encode_err)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample)).map_err(encode_err)?;
    }
    writer.finalize().map_err(encode_err)?;

    Ok(wav.into_inner())
}

#[allow(clippy::cast_possible_truncation)]
fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

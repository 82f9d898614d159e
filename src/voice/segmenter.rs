//! Energy-based utterance segmentation
//!
//! Splits a continuous microphone stream into utterance-sized chunks that can
//! be sent to STT one at a time: speech starts when block energy crosses a
//! threshold and ends after a run of silence.

use super::capture::rms;

/// Minimum audio energy threshold to consider speech
pub const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum speech in a segment (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Silence that closes a segment (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

/// State of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech
    Idle,
    /// Accumulating an utterance
    Speaking,
}

/// Accumulates speech between silences
#[derive(Debug)]
pub struct SpeechSegmenter {
    threshold: f32,
    state: SegmenterState,
    buffer: Vec<f32>,
    speech_samples: usize,
    silence_samples: usize,
}

impl Default for SpeechSegmenter {
    fn default() -> Self {
        Self::new(ENERGY_THRESHOLD)
    }
}

impl SpeechSegmenter {
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: SegmenterState::Idle,
            buffer: Vec::new(),
            speech_samples: 0,
            silence_samples: 0,
        }
    }

    /// Feed a block of samples
    ///
    /// Returns the finished utterance once enough speech has been followed by
    /// enough silence. Blips shorter than the minimum speech length are dropped.
    pub fn push(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        if samples.is_empty() {
            return None;
        }

        let energy = rms(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    tracing::trace!(energy, "speech started");
                    self.state = SegmenterState::Speaking;
                    self.buffer.extend_from_slice(samples);
                    self.speech_samples = samples.len();
                    self.silence_samples = 0;
                }
                None
            }
            SegmenterState::Speaking => {
                self.buffer.extend_from_slice(samples);
                if is_speech {
                    self.speech_samples += samples.len();
                    self.silence_samples = 0;
                } else {
                    self.silence_samples += samples.len();
                }

                if self.silence_samples <= SILENCE_SAMPLES {
                    return None;
                }

                if self.speech_samples >= MIN_SPEECH_SAMPLES {
                    tracing::debug!(samples = self.buffer.len(), "utterance segment complete");
                    let segment = std::mem::take(&mut self.buffer);
                    self.reset();
                    Some(segment)
                } else {
                    tracing::trace!(speech = self.speech_samples, "discarding short blip");
                    self.reset();
                    None
                }
            }
        }
    }

    /// Drop any partial utterance
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.buffer.clear();
        self.speech_samples = 0;
        self.silence_samples = 0;
    }

    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Whether no utterance is in progress
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == SegmenterState::Idle
    }
}

//! Voice input and output
//!
//! Input: microphone capture, utterance segmentation and STT, exposed as
//! capture sessions. Output: TTS rendered to the speaker, or the console.

mod capture;
mod playback;
mod recognition;
mod segmenter;
mod speaker;
mod stt;
mod tts;

pub use capture::{AudioCapture, SAMPLE_RATE, rms, samples_to_wav};
pub use playback::AudioPlayback;
pub use recognition::{
    ConsoleCapture, MicrophoneCapture, SpeechCapture, SpeechEvent, Utterance,
};
pub use segmenter::{ENERGY_THRESHOLD, SegmenterState, SpeechSegmenter};
pub use speaker::{ConsoleSpeaker, SpeechOutput, TtsSpeaker};
pub use stt::SpeechToText;
pub use tts::{TextToSpeech, TtsBackend};

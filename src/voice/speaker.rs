//! Speech output
//!
//! Speaking is fire-and-forget: [`SpeechOutput::speak`] queues the text and
//! returns immediately, and failures are only logged.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::playback::AudioPlayback;
use super::tts::TextToSpeech;

/// Something that can say text out loud
pub trait SpeechOutput: Send + Sync {
    /// Queue `text` for speaking in `locale` (BCP 47, e.g. `en-IN`)
    fn speak(&self, text: &str, locale: &str);
}

/// Prints spoken text to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeaker;

impl SpeechOutput for ConsoleSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        tracing::debug!(locale, text, "speaking to console");
        println!("🔊 {text}");
    }
}

/// Hosted TTS rendered on the default output device
///
/// Texts are synthesized and played in the order they were queued.
pub struct TtsSpeaker {
    queue: mpsc::UnboundedSender<String>,
}

impl TtsSpeaker {
    /// Start the synthesis task and playback thread
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the output device cannot be opened
    pub fn spawn(tts: TextToSpeech) -> crate::Result<Self> {
        let playback = AudioPlayback::open()?;
        let (text_tx, mut text_rx) = mpsc::unbounded_channel::<String>();
        let (audio_tx, audio_rx) = std::sync::mpsc::channel::<Vec<u8>>();
        let tts = Arc::new(tts);

        tokio::spawn(async move {
            while let Some(text) = text_rx.recv().await {
                match tts.synthesize(&text).await {
                    Ok(audio) => {
                        if audio_tx.send(audio).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "speech synthesis failed"),
                }
            }
        });

        std::thread::Builder::new()
            .name("rajesh-speaker".to_string())
            .spawn(move || {
                while let Ok(audio) = audio_rx.recv() {
                    if let Err(e) = playback.play_mp3(&audio) {
                        tracing::warn!(error = %e, "playback failed");
                    }
                }
            })?;

        Ok(Self { queue: text_tx })
    }
}

impl SpeechOutput for TtsSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        tracing::debug!(locale, text, "queueing speech");
        if self.queue.send(text.to_string()).is_err() {
            tracing::warn!("speech queue closed, dropping text");
        }
    }
}

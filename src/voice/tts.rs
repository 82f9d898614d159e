//! Text-to-speech via hosted APIs returning MP3

use serde::Serialize;

use crate::{Error, Result};

/// `OpenAI` speech endpoint
pub const OPENAI_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

/// ElevenLabs endpoint prefix; the voice id is appended
pub const ELEVENLABS_TTS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech/";

const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// Which hosted TTS API to call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsBackend {
    OpenAi,
    ElevenLabs,
}

#[derive(Serialize)]
struct OpenAiSpeech<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f64,
}

#[derive(Serialize)]
struct ElevenLabsSpeech<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Synthesizes spoken summaries and prompts to MP3
pub struct TextToSpeech {
    http: reqwest::Client,
    backend: TtsBackend,
    endpoint: String,
    key: String,
    voice: String,
    model: String,
    speed: f64,
}

impl TextToSpeech {
    /// `OpenAI` speech with the given model, voice and speed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is empty
    pub fn openai(api_key: String, model: String, voice: String, speed: f64) -> Result<Self> {
        Self::with_backend(TtsBackend::OpenAi, api_key, model, voice, speed)
    }

    /// ElevenLabs speech for a voice id
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is empty
    pub fn elevenlabs(api_key: String, voice_id: String) -> Result<Self> {
        Self::with_backend(
            TtsBackend::ElevenLabs,
            api_key,
            ELEVENLABS_MODEL.to_string(),
            voice_id,
            1.0,
        )
    }

    fn with_backend(
        backend: TtsBackend,
        key: String,
        model: String,
        voice: String,
        speed: f64,
    ) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(Error::Config(format!("{backend:?} API key required for speech output")));
        }

        let endpoint = match backend {
            TtsBackend::OpenAi => OPENAI_TTS_URL.to_string(),
            TtsBackend::ElevenLabs => format!("{ELEVENLABS_TTS_URL}{voice}"),
        };

        Ok(Self {
            http: reqwest::Client::new(),
            backend,
            endpoint,
            key,
            voice,
            model,
            speed,
        })
    }

    /// Send requests to `url` instead of the hosted endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    #[must_use]
    pub const fn backend(&self) -> TtsBackend {
        self.backend
    }

    /// Synthesize `text` to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tts`] if the API rejects the request, or a transport error
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(backend = ?self.backend, chars = text.len(), "synthesizing speech");

        let request = self.http.post(&self.endpoint);
        let request = match self.backend {
            TtsBackend::OpenAi => request.bearer_auth(&self.key).json(&OpenAiSpeech {
                model: &self.model,
                input: text,
                voice: &self.voice,
                speed: self.speed,
            }),
            TtsBackend::ElevenLabs => request.header("xi-api-key", &self.key).json(&ElevenLabsSpeech {
                text,
                model_id: &self.model,
            }),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("{:?} returned {status}: {detail}", self.backend)));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}

//! Speech-to-text via a Whisper-compatible transcription endpoint

use crate::{Error, Result};

/// OpenAI transcription endpoint
pub const WHISPER_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Response from the transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes WAV audio to text
pub struct SpeechToText {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    language: Option<String>,
}

impl SpeechToText {
    /// Create a Whisper client
    ///
    /// `locale` is a BCP 47 tag such as `en-IN`; its language subtag is sent
    /// as the transcription language hint.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new_whisper(api_key: String, model: String, locale: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for Whisper".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url: WHISPER_URL.to_string(),
            api_key,
            model,
            language: language_subtag(locale),
        })
    }

    /// Override the endpoint (self-hosted Whisper servers)
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Transcribe WAV bytes
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API reports an error
    pub async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = wav.len(), "starting transcription");

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Stt(format!("transcription error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await?;
        tracing::debug!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

/// `en-IN` → `en`
fn language_subtag(locale: &str) -> Option<String> {
    locale
        .split(['-', '_'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_subtag() {
        assert_eq!(language_subtag("en-IN").as_deref(), Some("en"));
        assert_eq!(language_subtag("hi_IN").as_deref(), Some("hi"));
        assert_eq!(language_subtag(""), None);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(SpeechToText::new_whisper(String::new(), "whisper-1".into(), "en-IN").is_err());
    }
}

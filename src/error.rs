//! Error types for the Rajesh assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No speech capture backend is available; voice mode is off
    #[error("speech recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Quote provider has no data for the symbol
    #[error("symbol not found: {0}")]
    NotFound(String),

    /// Quote request failed in transport or payload
    #[error("quote fetch failed: {0}")]
    Fetch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the failure came from the quote path (provider, transport or payload)
    #[must_use]
    pub const fn is_quote_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Fetch(_) | Self::Http(_) | Self::Serialization(_)
        )
    }
}

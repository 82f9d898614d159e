//! Configuration management
//!
//! Values are layered env > TOML file > defaults.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::quote::{DEFAULT_QUOTE_URL, DEFAULT_SEARCH_URL};
use crate::resolver::{AliasTable, SymbolResolver};
use crate::session::SessionSettings;
use crate::{Error, Result};

use file::RajeshConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Quote provider configuration
    pub provider: ProviderConfig,

    /// Voice processing configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Spoken name → symbol table
    pub aliases: AliasTable,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// Quote provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub quote_url: String,
    pub search_url: String,

    /// When set, quotes come from this Rajesh server rather than upstream
    pub backend_url: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// BCP 47 locale for recognition and speech
    pub locale: String,

    pub wake_phrases: Vec<String>,
    pub stop_phrases: Vec<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// Silence after which a capture session ends by itself
    pub session_timeout: Duration,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl Config {
    /// Load configuration from the environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration, optionally forcing voice off
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok(), disable_voice)
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn from_sources<E>(fc: RajeshConfigFile, env: E, disable_voice: bool) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            port: env("RAJESH_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("RAJESH_STATIC_DIR")
                .map(PathBuf::from)
                .or(fc.server.static_dir),
        };

        let provider = ProviderConfig {
            quote_url: env("RAJESH_QUOTE_URL")
                .or(fc.provider.quote_url)
                .unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            search_url: env("RAJESH_SEARCH_URL")
                .or(fc.provider.search_url)
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            backend_url: env("RAJESH_BACKEND_URL")
                .or(fc.provider.backend_url)
                .filter(|u| !u.trim().is_empty()),
        };

        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        let defaults = SessionSettings::default();
        let voice = VoiceConfig {
            enabled: !disable_voice && fc.voice.enabled.unwrap_or(true),
            locale: env("RAJESH_LOCALE")
                .or(fc.voice.locale)
                .unwrap_or(defaults.locale),
            wake_phrases: fc.voice.wake_phrases.unwrap_or(defaults.wake_phrases),
            stop_phrases: fc.voice.stop_phrases.unwrap_or(defaults.stop_phrases),
            stt_model: env("RAJESH_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: env("RAJESH_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: fc.voice.tts_voice.unwrap_or_else(|| "alloy".to_string()),
            tts_speed: fc.voice.tts_speed.unwrap_or(1.0),
            session_timeout: Duration::from_secs(fc.voice.session_timeout_secs.unwrap_or(8)),
        };

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .filter(|k| !k.is_empty()),
            elevenlabs: env("ELEVENLABS_API_KEY")
                .or(fc.api_keys.elevenlabs)
                .filter(|k| !k.is_empty()),
        };

        let mut aliases = if fc.replace_default_aliases.unwrap_or(false) {
            AliasTable::from_aliases(Vec::new())
        } else {
            AliasTable::default()
        };
        aliases.extend(fc.aliases);

        let config = Self {
            server,
            provider,
            voice,
            api_keys,
            aliases,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.voice.locale.trim().is_empty() {
            return Err(Error::Config("voice.locale must not be empty".to_string()));
        }
        if self.voice.wake_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(Error::Config("at least one wake phrase is required".to_string()));
        }
        if !(0.25..=4.0).contains(&self.voice.tts_speed) {
            return Err(Error::Config(format!(
                "voice.tts_speed must be between 0.25 and 4.0, got {}",
                self.voice.tts_speed
            )));
        }
        if self.aliases.is_empty() {
            return Err(Error::Config("alias table is empty".to_string()));
        }
        Ok(())
    }

    /// Settings for a conversation session
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            wake_phrases: self.voice.wake_phrases.clone(),
            stop_phrases: self.voice.stop_phrases.clone(),
            locale: self.voice.locale.clone(),
        }
    }

    /// Symbol resolver over the configured alias table
    #[must_use]
    pub fn resolver(&self) -> SymbolResolver {
        SymbolResolver::new(self.aliases.clone())
    }
}

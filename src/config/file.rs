//! TOML configuration file loading
//!
//! Supports `~/.config/rajesh/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::resolver::Alias;
use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RajeshConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Quote provider configuration
    #[serde(default)]
    pub provider: ProviderFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Extra aliases, appended after the built-in table in file order
    #[serde(default)]
    pub aliases: Vec<Alias>,

    /// Use only the aliases from this file
    #[serde(default)]
    pub replace_default_aliases: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    pub port: Option<u16>,
    /// Directory of web UI files served at `/`
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProviderFileConfig {
    /// Quote endpoint prefix, symbol appended
    pub quote_url: Option<String>,
    /// Search endpoint prefix, query appended
    pub search_url: Option<String>,
    /// Fetch quotes from another Rajesh server instead of upstream
    pub backend_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    pub enabled: Option<bool>,
    /// BCP 47 locale (e.g. "en-IN")
    pub locale: Option<String>,
    pub wake_phrases: Option<Vec<String>>,
    pub stop_phrases: Option<Vec<String>>,
    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,
    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,
    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,
    /// TTS speed multiplier
    pub tts_speed: Option<f64>,
    /// Seconds of silence before a capture session ends on its own
    pub session_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is invalid
pub fn parse(content: &str) -> Result<RajeshConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load a config file from `path`
///
/// Returns the default (empty) config if the file doesn't exist or can't be parsed.
pub fn load_from(path: &Path) -> RajeshConfigFile {
    if !path.exists() {
        return RajeshConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match parse(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                RajeshConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
            RajeshConfigFile::default()
        }
    }
}

/// Load the config file from the standard path
pub fn load_config_file() -> RajeshConfigFile {
    config_file_path().map_or_else(RajeshConfigFile::default, |path| load_from(&path))
}

/// Return the config file path: `~/.config/rajesh/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("rajesh").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let config = parse(
            r#"
            replace_default_aliases = false

            [server]
            port = 8080

            [voice]
            locale = "hi-IN"
            wake_phrases = ["rajesh", "hey rajesh"]

            [[aliases]]
            phrase = "wipro"
            symbol = "WIPRO.NS"

            [[aliases]]
            phrase = "bajaj finance"
            symbol = "BAJFINANCE.NS"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.voice.locale.as_deref(), Some("hi-IN"));
        assert_eq!(config.aliases.len(), 2);
        assert_eq!(config.aliases[1].symbol, "BAJFINANCE.NS");
        assert!(config.provider.backend_url.is_none());
    }

    #[test]
    fn test_parse_empty_file() {
        let config = parse("").unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.voice.enabled.is_none());
    }

    #[test]
    fn test_parse_invalid_file() {
        assert!(parse("[server]\nport = \"high\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = load_from(Path::new("/nonexistent/rajesh/config.toml"));
        assert!(config.server.port.is_none());
    }
}

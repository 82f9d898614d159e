//! Daemon - the main assistant service
//!
//! Runs the quote API in the background and the listening loop in the
//! foreground until interrupted.

use std::sync::Arc;

use crate::api::ApiServerBuilder;
use crate::quote::{BackendClient, QuoteProvider, YahooClient};
use crate::session::{Listener, Outcome, Session};
use crate::voice::{
    ConsoleCapture, ConsoleSpeaker, MicrophoneCapture, SpeechCapture, SpeechOutput,
    SpeechToText, TextToSpeech, TtsSpeaker,
};
use crate::{Config, Result};

/// The Rajesh daemon - quote API plus voice loop
pub struct Daemon {
    config: Config,
    provider: Arc<dyn QuoteProvider>,
}

impl Daemon {
    /// Create a daemon from configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        let provider = build_provider(&config);
        Self { config, provider }
    }

    /// Quote provider in use
    #[must_use]
    pub fn provider(&self) -> Arc<dyn QuoteProvider> {
        Arc::clone(&self.provider)
    }

    /// Serve the API only, until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn serve(self) -> Result<()> {
        ApiServerBuilder::new(self.provider, self.config.server.port)
            .static_dir(self.config.server.static_dir)
            .build()
            .run_until(shutdown_signal())
            .await
    }

    /// Run the API server and the listening loop
    ///
    /// With `console` set, utterances are typed on stdin and responses are
    /// printed instead of spoken.
    ///
    /// # Errors
    ///
    /// Returns error if the API server fails to start
    pub async fn run(self, console: bool) -> Result<()> {
        let api = ApiServerBuilder::new(Arc::clone(&self.provider), self.config.server.port)
            .static_dir(self.config.server.static_dir.clone())
            .build()
            .spawn();

        if !self.config.voice.enabled {
            tracing::info!("voice disabled, serving quotes only");
            shutdown_signal().await;
            api.abort();
            return Ok(());
        }

        let speaker = build_speaker(&self.config, console);
        let mut session = Session::new(
            self.config.session_settings(),
            self.config.resolver(),
            Arc::clone(&self.provider),
            speaker,
        );

        let capture = build_capture(&self.config, console);
        tracing::info!(
            capture = capture.name(),
            wake_phrases = ?self.config.voice.wake_phrases,
            "assistant ready"
        );

        let mut listener = Listener::new(capture);
        listener
            .run(&mut session, shutdown_signal(), |_, outcome| {
                if let Outcome::Quoted(quote) = outcome {
                    println!("{}\n", quote.card());
                }
            })
            .await;

        if !session.voice_available() {
            tracing::info!("voice unavailable, quote API still serving until Ctrl-C");
            shutdown_signal().await;
        }

        tracing::info!(
            sessions = listener.sessions_started(),
            lines = session.transcript().len(),
            "assistant stopped"
        );
        api.abort();
        Ok(())
    }
}

/// Upstream client, or a remote Rajesh server when a backend URL is configured
#[must_use]
pub fn build_provider(config: &Config) -> Arc<dyn QuoteProvider> {
    match &config.provider.backend_url {
        Some(url) => {
            tracing::info!(url, "using remote quote backend");
            Arc::new(BackendClient::new(url))
        }
        None => Arc::new(YahooClient::new(
            config.provider.quote_url.clone(),
            config.provider.search_url.clone(),
        )),
    }
}

/// Hosted TTS when a key and an output device are available, console otherwise
#[must_use]
pub fn build_speaker(config: &Config, console: bool) -> Arc<dyn SpeechOutput> {
    if console {
        return Arc::new(ConsoleSpeaker);
    }

    let voice = &config.voice;
    let tts = if let Some(key) = &config.api_keys.openai {
        TextToSpeech::openai(
            key.clone(),
            voice.tts_model.clone(),
            voice.tts_voice.clone(),
            voice.tts_speed,
        )
    } else if let Some(key) = &config.api_keys.elevenlabs {
        TextToSpeech::elevenlabs(key.clone(), voice.tts_voice.clone())
    } else {
        tracing::info!("no TTS key configured, speaking to console");
        return Arc::new(ConsoleSpeaker);
    };

    match tts.and_then(TtsSpeaker::spawn) {
        Ok(speaker) => Arc::new(speaker),
        Err(e) => {
            tracing::warn!(error = %e, "speech output unavailable, speaking to console");
            Arc::new(ConsoleSpeaker)
        }
    }
}

/// Microphone + Whisper when an `OpenAI` key is configured, stdin otherwise
#[must_use]
pub fn build_capture(config: &Config, console: bool) -> Box<dyn SpeechCapture> {
    if console {
        return Box::new(ConsoleCapture::default());
    }

    let stt = config.api_keys.openai.as_ref().map(|key| {
        SpeechToText::new_whisper(key.clone(), config.voice.stt_model.clone(), &config.voice.locale)
    });

    match stt {
        Some(Ok(stt)) => Box::new(MicrophoneCapture::new(stt, config.voice.session_timeout)),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "speech recognition unavailable, reading from console");
            Box::new(ConsoleCapture::default())
        }
        None => {
            tracing::info!("no STT key configured, reading utterances from console");
            Box::new(ConsoleCapture::default())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

//! Conversation session
//!
//! A [`Session`] owns everything one conversation mutates: the wake state, the
//! user's listening toggle, and the transcript. It is driven by one event at a
//! time from a single consumer, so none of that state needs locking.
//!
//! | State  | Final utterance          | Action                  | Next   |
//! |--------|--------------------------|-------------------------|--------|
//! | Asleep | contains a wake phrase   | greet                   | Awake  |
//! | Asleep | anything else            | nothing                 | Asleep |
//! | Awake  | resolves to a symbol     | fetch and announce      | Awake  |
//! | Awake  | contains a stop phrase   | say goodbye             | Asleep |
//! | Awake  | anything else            | ask for a symbol again  | Awake  |

mod gateway;
mod listener;
mod transcript;

use std::sync::Arc;

pub use gateway::{APOLOGY, APOLOGY_SPOKEN, QuoteGateway};
pub use listener::Listener;
pub use transcript::{MAX_TRANSCRIPT_ENTRIES, Speaker, Transcript, TranscriptEntry};

use crate::quote::{Quote, QuoteProvider};
use crate::resolver::SymbolResolver;
use crate::voice::{SpeechEvent, SpeechOutput};

/// A message with separate display and spoken forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub text: &'static str,
    pub spoken: &'static str,
}

impl Prompt {
    const fn same(text: &'static str) -> Self {
        Self { text, spoken: text }
    }
}

pub const GREETING: Prompt = Prompt::same("I'm here. Which Indian stock should I check?");

pub const FAREWELL: Prompt = Prompt::same("Okay, say Rajesh again when you need me.");

pub const CLARIFY: Prompt = Prompt {
    text: "I didn't catch the symbol. You can say: price of Reliance, or TCS quote.",
    spoken: "I didn't catch the symbol. You can say: price of Reliance, or T C S quote.",
};

pub const LISTENING_STARTED: Prompt = Prompt {
    text: "Listening... say Rajesh to wake me.",
    spoken: "Listening. Say Rajesh to wake me.",
};

pub const LISTENING_STOPPED: Prompt = Prompt::same("Stopped listening.");

pub const RECOGNITION_UNAVAILABLE: Prompt =
    Prompt::same("Speech recognition is not available. Quotes can still be requested manually.");

/// Wake state of the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Asleep,
    Awake,
}

/// What handling one event did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Interim result, empty text, or non-wake speech while asleep
    Ignored,
    /// Wake phrase heard, greeting spoken
    Woke,
    /// Quote fetched and announced
    Quoted(Quote),
    /// Quote fetch failed, apology spoken
    QuoteFailed(String),
    /// Stop phrase heard, farewell spoken
    Slept,
    /// Nothing recognizable, clarification spoken
    Clarified,
    /// Capture reported a recognition failure
    RecognitionError(String),
}

/// Case-insensitive substring matcher for trigger phrases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    #[must_use]
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// First phrase contained in `text`
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.phrases
            .iter()
            .find(|p| text.contains(p.as_str()))
            .map(String::as_str)
    }

    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub wake_phrases: Vec<String>,
    pub stop_phrases: Vec<String>,
    /// BCP 47 locale used for speech output
    pub locale: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            wake_phrases: vec!["rajesh".to_string()],
            stop_phrases: vec!["stop".to_string(), "thanks".to_string()],
            locale: "en-IN".to_string(),
        }
    }
}

/// One conversation with the assistant
pub struct Session {
    state: ConversationState,
    listening: bool,
    voice_available: bool,
    wake: PhraseSet,
    stop: PhraseSet,
    locale: String,
    resolver: SymbolResolver,
    gateway: QuoteGateway,
    speaker: Arc<dyn SpeechOutput>,
    transcript: Transcript,
    last_quote: Option<Quote>,
}

impl Session {
    #[must_use]
    pub fn new(
        settings: SessionSettings,
        resolver: SymbolResolver,
        provider: Arc<dyn QuoteProvider>,
        speaker: Arc<dyn SpeechOutput>,
    ) -> Self {
        let gateway = QuoteGateway::new(provider, Arc::clone(&speaker), settings.locale.clone());
        Self {
            state: ConversationState::Asleep,
            listening: false,
            voice_available: true,
            wake: PhraseSet::new(&settings.wake_phrases),
            stop: PhraseSet::new(&settings.stop_phrases),
            locale: settings.locale,
            resolver,
            gateway,
            speaker,
            transcript: Transcript::default(),
            last_quote: None,
        }
    }

    /// Handle one event from a capture session
    ///
    /// `End` is the listener's concern and is ignored here.
    pub async fn handle_event(&mut self, event: SpeechEvent) -> Outcome {
        match event {
            SpeechEvent::Result(utterance) if utterance.is_final => {
                self.handle_final(&utterance.text).await
            }
            SpeechEvent::Result(_) | SpeechEvent::End => Outcome::Ignored,
            SpeechEvent::Error(message) => {
                tracing::warn!(error = %message, "recognition error");
                self.transcript
                    .push(Speaker::Assistant, format!("Recognition error: {message}"));
                Outcome::RecognitionError(message)
            }
        }
    }

    /// Handle one final utterance
    pub async fn handle_final(&mut self, text: &str) -> Outcome {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return Outcome::Ignored;
        }
        self.transcript.push(Speaker::User, text.as_str());

        match self.state {
            ConversationState::Asleep => {
                let Some(phrase) = self.wake.find(&text) else {
                    return Outcome::Ignored;
                };
                tracing::info!(wake_phrase = phrase, "wake phrase detected");
                self.state = ConversationState::Awake;
                self.say(GREETING);
                Outcome::Woke
            }
            ConversationState::Awake => {
                if let Some(symbol) = self.resolver.resolve(&text) {
                    return self.quote(&symbol).await;
                }

                if self.stop.find(&text).is_some() {
                    self.state = ConversationState::Asleep;
                    self.say(FAREWELL);
                    return Outcome::Slept;
                }

                self.say(CLARIFY);
                Outcome::Clarified
            }
        }
    }

    /// Fetch and announce a symbol directly, whatever the wake state
    pub async fn quote(&mut self, symbol: &str) -> Outcome {
        match self
            .gateway
            .fetch_and_announce(symbol, &mut self.transcript)
            .await
        {
            Some(quote) => {
                self.last_quote = Some(quote.clone());
                Outcome::Quoted(quote)
            }
            None => Outcome::QuoteFailed(symbol.to_string()),
        }
    }

    /// Turn the listening toggle on
    pub fn start_listening(&mut self) {
        if self.listening || !self.voice_available {
            return;
        }
        self.listening = true;
        self.say(LISTENING_STARTED);
    }

    /// Turn the listening toggle off
    pub fn stop_listening(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        self.say(LISTENING_STOPPED);
    }

    /// Record that no capture session can be started; reported once
    pub fn recognition_unavailable(&mut self, reason: &str) {
        if !self.voice_available {
            return;
        }
        tracing::warn!(reason, "speech recognition unavailable, voice mode off");
        self.voice_available = false;
        self.listening = false;
        self.say(RECOGNITION_UNAVAILABLE);
    }

    fn say(&mut self, prompt: Prompt) {
        self.transcript.push(Speaker::Assistant, prompt.text);
        self.speaker.speak(prompt.spoken, &self.locale);
    }

    #[must_use]
    pub const fn state(&self) -> ConversationState {
        self.state
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub const fn voice_available(&self) -> bool {
        self.voice_available
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Most recently displayed quote
    #[must_use]
    pub const fn last_quote(&self) -> Option<&Quote> {
        self.last_quote.as_ref()
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

//! Quote fetch and announcement

use std::sync::Arc;

use super::transcript::{Speaker, Transcript};
use crate::quote::{Quote, QuoteProvider};
use crate::voice::SpeechOutput;

/// Apology shown in the transcript when a quote cannot be fetched
pub const APOLOGY: &str = "Sorry, I couldn't get that quote.";

/// Apology as spoken
pub const APOLOGY_SPOKEN: &str = "Sorry, I could not get that quote.";

/// Fetches a quote for a resolved symbol and speaks the result
///
/// Failures never escape: not-found, transport and payload errors all end in
/// the same spoken apology.
#[derive(Clone)]
pub struct QuoteGateway {
    provider: Arc<dyn QuoteProvider>,
    speaker: Arc<dyn SpeechOutput>,
    locale: String,
}

impl QuoteGateway {
    #[must_use]
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        speaker: Arc<dyn SpeechOutput>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            speaker,
            locale: locale.into(),
        }
    }

    /// Fetch `symbol`, speak a one-line summary, and return the quote for display
    ///
    /// Returns `None` after speaking the apology if the fetch failed.
    pub async fn fetch_and_announce(&self, symbol: &str, transcript: &mut Transcript) -> Option<Quote> {
        transcript.push(Speaker::Assistant, format!("Fetching {symbol}..."));

        match self.provider.quote(symbol).await {
            Ok(quote) => {
                let summary = quote.summary();
                tracing::info!(symbol, provider = self.provider.name(), "quote announced");
                self.speaker.speak(&summary, &self.locale);
                Some(quote)
            }
            Err(e) => {
                tracing::warn!(error = %e, symbol, provider = self.provider.name(), "quote fetch failed");
                transcript.push(Speaker::Assistant, APOLOGY);
                self.speaker.speak(APOLOGY_SPOKEN, &self.locale);
                None
            }
        }
    }
}

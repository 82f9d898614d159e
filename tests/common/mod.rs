//! Shared test utilities

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rajesh::quote::{Quote, QuoteProvider, SearchItem};
use rajesh::session::{Session, SessionSettings};
use rajesh::voice::{SpeechCapture, SpeechEvent, SpeechOutput};
use rajesh::{AliasTable, Error, Result, SymbolResolver};
use tokio::sync::mpsc;

/// Build a fully populated quote
#[must_use]
pub fn sample_quote(symbol: &str, name: &str, price: f64, change: f64) -> Quote {
    Quote {
        short_name: Some(name.to_string()),
        long_name: Some(format!("{name} Limited")),
        exchange: Some("NSE".to_string()),
        currency: Some("INR".to_string()),
        market_state: Some("REGULAR".to_string()),
        regular_market_price: Some(price),
        regular_market_change: Some(change),
        regular_market_change_percent: Some(change / price * 100.0),
        regular_market_time: Some(1_760_000_000),
        previous_close: Some(price - change),
        open: Some(price - change / 2.0),
        day_low: Some(price - 10.0),
        day_high: Some(price + 10.0),
        fifty_two_week_low: Some(price * 0.8),
        fifty_two_week_high: Some(price * 1.2),
        ..Quote::new(symbol)
    }
}

/// Records everything spoken
#[derive(Default)]
pub struct RecordingSpeaker {
    spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSpeaker {
    /// Spoken texts in order
    pub fn texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    /// Locales passed with each text
    pub fn locales(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, locale)| locale.clone())
            .collect()
    }

    pub fn last(&self) -> Option<String> {
        self.texts().pop()
    }
}

impl SpeechOutput for RecordingSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), locale.to_string()));
    }
}

/// In-memory quote provider
#[derive(Default)]
pub struct StaticProvider {
    quotes: HashMap<String, Quote>,
    search: Vec<SearchItem>,
    failing: bool,
    requested: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    pub fn with_search(mut self, items: Vec<SearchItem>) -> Self {
        self.search = items;
        self
    }

    /// Every request fails with a transport-style error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Symbols requested so far
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.requested.lock().unwrap().push(symbol.to_string());
        if self.failing {
            return Err(Error::Fetch("upstream unreachable".to_string()));
        }
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::NotFound(symbol.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        if self.failing {
            return Err(Error::Fetch("upstream unreachable".to_string()));
        }
        let query = query.to_lowercase();
        Ok(self
            .search
            .iter()
            .filter(|item| {
                item.shortname
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }
}

/// Provider whose quote requests never complete
#[derive(Default)]
pub struct HungProvider {
    requested: Mutex<Vec<String>>,
}

impl HungProvider {
    /// Symbols requested so far
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProvider for HungProvider {
    fn name(&self) -> &'static str {
        "hung"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.requested.lock().unwrap().push(symbol.to_string());
        std::future::pending().await
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchItem>> {
        std::future::pending().await
    }
}

/// Capture that plays back scripted sessions, then reports itself unavailable
pub struct ScriptedCapture {
    sessions: VecDeque<Vec<SpeechEvent>>,
    pub stops: usize,
}

impl ScriptedCapture {
    pub fn new(sessions: Vec<Vec<SpeechEvent>>) -> Self {
        Self {
            sessions: sessions.into(),
            stops: 0,
        }
    }

    /// Sessions not yet played
    pub fn remaining(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl SpeechCapture for ScriptedCapture {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn start(&mut self, events: mpsc::Sender<SpeechEvent>) -> Result<()> {
        let script = self
            .sessions
            .pop_front()
            .ok_or_else(|| Error::RecognitionUnavailable("script exhausted".to_string()))?;

        tokio::spawn(async move {
            for event in script {
                if events.send(event).await.is_err() {
                    return;
                }
            }
            let _ = events.send(SpeechEvent::End).await;
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Session over the default alias table and settings
pub fn test_session(
    provider: Arc<dyn QuoteProvider>,
    speaker: Arc<dyn SpeechOutput>,
) -> Session {
    Session::new(
        SessionSettings::default(),
        SymbolResolver::new(AliasTable::default()),
        provider,
        speaker,
    )
}

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test router");
    });
    format!("http://{addr}")
}

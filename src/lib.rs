//! Rajesh - voice assistant for Indian stock quotes
//!
//! This library provides the core functionality for the Rajesh assistant:
//! - Symbol resolution from spoken company names
//! - Quote fetching and normalization
//! - Wake-phrase conversation sessions with continuous listening
//! - Voice I/O (microphone capture, STT, TTS, playback)
//! - An HTTP API relaying quotes and searches
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Interfaces                        │
//! │     Microphone  │  Console  │  HTTP API  │  Web UI   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Rajesh Daemon                       │
//! │  Listener  │  Session  │  Resolver  │  STT/TTS      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Quote Provider                         │
//! │      Yahoo Finance  │  Remote Rajesh backend         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod quote;
pub mod resolver;
pub mod session;
pub mod voice;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use quote::{BackendClient, Direction, Quote, QuoteProvider, SearchItem, YahooClient};
pub use resolver::{Alias, AliasTable, SymbolResolver};
pub use session::{ConversationState, Outcome, Session, SessionSettings, Transcript};

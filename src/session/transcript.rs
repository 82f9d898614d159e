//! Conversation transcript

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("You"),
            Self::Assistant => f.write_str("Rajesh"),
        }
    }
}

/// One transcript line
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Lines kept by a default transcript
pub const MAX_TRANSCRIPT_ENTRIES: usize = 500;

/// Log of the conversation, keeping the most recent lines
#[derive(Debug)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    limit: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_limit(MAX_TRANSCRIPT_ENTRIES)
    }
}

impl Transcript {
    /// Transcript keeping at most `limit` lines (at least one)
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Append a line, dropping the oldest once the limit is reached
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(target: "rajesh::transcript", %speaker, "{text}");
        if self.entries.len() >= self.limit {
            let excess = self.entries.len() + 1 - self.limit;
            self.entries.drain(..excess);
        }
        self.entries.push(TranscriptEntry {
            speaker,
            text,
            at: Utc::now(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Lines spoken by `speaker`, oldest first
    pub fn by(&self, speaker: Speaker) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.speaker == speaker)
            .map(|e| e.text.as_str())
    }

    #[must_use]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

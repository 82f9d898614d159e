//! Spoken company name to ticker resolution
//!
//! Resolution works over a closed vocabulary: only instruments present in the
//! [`AliasTable`] can be recognized. Matching is substring-based and the first
//! qualifying entry in table order wins, so a short alias listed before a
//! longer one that contains it (`hdfc` before `hdfc bank`) shadows the longer
//! one. Table authors own that ordering.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Trailing phrase after a trigger word, e.g. "price of <phrase>"
static PHRASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:price|quote|of|for)\s+([a-z0-9 .&-]+)").expect("valid phrase pattern")
});

/// Built-in aliases for popular NSE listings
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("reliance", "RELIANCE.NS"),
    ("tcs", "TCS.NS"),
    ("infosys", "INFY.NS"),
    ("infy", "INFY.NS"),
    ("hdfc", "HDFCBANK.NS"),
    ("hdfc bank", "HDFCBANK.NS"),
    ("icici", "ICICIBANK.NS"),
    ("icici bank", "ICICIBANK.NS"),
    ("sbi", "SBIN.NS"),
    ("state bank", "SBIN.NS"),
    ("hindu", "HINDUNILVR.NS"),
    ("hindustan unilever", "HINDUNILVR.NS"),
    ("tata motors", "TATAMOTORS.NS"),
    ("itc", "ITC.NS"),
    ("maruti", "MARUTI.NS"),
];

/// A single phrase → symbol mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Lowercase spoken phrase
    pub phrase: String,
    /// Exchange-suffixed ticker
    pub symbol: String,
}

impl Alias {
    /// Create an alias, normalizing the phrase to trimmed lowercase
    #[must_use]
    pub fn new(phrase: &str, symbol: &str) -> Self {
        Self {
            phrase: phrase.trim().to_lowercase(),
            symbol: symbol.trim().to_string(),
        }
    }
}

/// Ordered phrase → symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_ALIASES)
    }
}

impl AliasTable {
    /// Build a table from `(phrase, symbol)` pairs, keeping their order
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs.iter().map(|(p, s)| Alias::new(p, s)).collect(),
        }
    }

    /// Build a table from already-constructed aliases
    #[must_use]
    pub fn from_aliases(aliases: Vec<Alias>) -> Self {
        let entries = aliases
            .into_iter()
            .map(|a| Alias::new(&a.phrase, &a.symbol))
            .filter(|a| !a.phrase.is_empty() && !a.symbol.is_empty())
            .collect();
        Self { entries }
    }

    /// Append aliases after the existing entries
    pub fn extend(&mut self, aliases: impl IntoIterator<Item = Alias>) {
        self.entries.extend(
            aliases
                .into_iter()
                .map(|a| Alias::new(&a.phrase, &a.symbol))
                .filter(|a| !a.phrase.is_empty() && !a.symbol.is_empty()),
        );
    }

    /// Exact lookup of a phrase
    #[must_use]
    pub fn get(&self, phrase: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.phrase == phrase)
            .map(|a| a.symbol.as_str())
    }

    /// First entry whose phrase occurs inside `text`
    #[must_use]
    pub fn first_contained_in(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| text.contains(a.phrase.as_str()))
            .map(|a| a.symbol.as_str())
    }

    /// Entries in table order
    #[must_use]
    pub fn entries(&self) -> &[Alias] {
        &self.entries
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

/// Resolves free-form utterances to canonical symbols
#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    aliases: AliasTable,
}

impl SymbolResolver {
    #[must_use]
    pub const fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Resolve an utterance to a symbol
    ///
    /// Tries a direct alias substring match first, then the trailing phrase
    /// after `price`/`quote`/`of`/`for` as an exact alias.
    #[must_use]
    pub fn resolve(&self, utterance: &str) -> Option<String> {
        let text = utterance.to_lowercase();

        if let Some(symbol) = self.aliases.first_contained_in(&text) {
            tracing::debug!(utterance, symbol, "resolved by alias");
            return Some(symbol.to_string());
        }

        let phrase = extract_phrase(&text)?;
        let symbol = self.aliases.get(&phrase)?;
        tracing::debug!(utterance, phrase, symbol, "resolved by phrase pattern");
        Some(symbol.to_string())
    }

    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }
}

/// Trailing noun phrase after the first trigger word, trimmed and lowercased
fn extract_phrase(text: &str) -> Option<String> {
    PHRASE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|p| !p.is_empty())
}

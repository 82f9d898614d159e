//! Market quotes
//!
//! [`Quote`] is the stable internal shape every provider is normalized into.
//! Numeric fields are optional because not every instrument reports every
//! metric, and "no value" must stay distinguishable from zero all the way to
//! the spoken and displayed output.

mod backend;
mod yahoo;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use backend::BackendClient;
pub use yahoo::{
    DEFAULT_QUOTE_URL, DEFAULT_SEARCH_URL, YahooClient, YahooQuote, YahooQuoteResponse,
    YahooSearchResponse, normalize,
};

use crate::Result;

/// Normalized market quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_market_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_market_change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_market_change_percent: Option<f64>,
    /// Unix seconds of the last regular-session trade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_market_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_high: Option<f64>,
}

/// Price movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

impl Quote {
    /// Create a quote carrying only its symbol
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            short_name: None,
            long_name: None,
            exchange: None,
            currency: None,
            market_state: None,
            regular_market_price: None,
            regular_market_change: None,
            regular_market_change_percent: None,
            regular_market_time: None,
            previous_close: None,
            open: None,
            day_low: None,
            day_high: None,
            fifty_two_week_low: None,
            fifty_two_week_high: None,
        }
    }

    /// Direction of the regular-session change; absent change counts as up
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self.regular_market_change {
            Some(change) if change < 0.0 => Direction::Down,
            _ => Direction::Up,
        }
    }

    /// Name to speak: short name if reported, otherwise the symbol
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.symbol)
    }

    /// One-sentence spoken summary
    #[must_use]
    pub fn summary(&self) -> String {
        let currency = self
            .currency
            .as_deref()
            .map(|c| format!(" {c}"))
            .unwrap_or_default();

        format!(
            "{} is {} at {}{currency}, change {} or {} percent.",
            self.display_name(),
            self.direction(),
            format_value(self.regular_market_price),
            format_value(self.regular_market_change),
            format_value(self.regular_market_change_percent),
        )
    }

    /// Multi-line display card
    #[must_use]
    pub fn card(&self) -> String {
        let mut lines = vec![
            format!("Symbol: {}", self.symbol),
            format!(
                "{} {}",
                format_value(self.regular_market_price),
                self.currency.as_deref().unwrap_or_default()
            )
            .trim_end()
            .to_string(),
            format!(
                "Change: {} ({}%)",
                format_value(self.regular_market_change),
                format_value(self.regular_market_change_percent)
            ),
            format!(
                "Open {} • Prev {}",
                format_value(self.open),
                format_value(self.previous_close)
            ),
            format!(
                "Day {} - {}",
                format_value(self.day_low),
                format_value(self.day_high)
            ),
            format!(
                "52W {} - {}",
                format_value(self.fifty_two_week_low),
                format_value(self.fifty_two_week_high)
            ),
            format!(
                "Market: {} • {}",
                self.exchange.as_deref().unwrap_or("-"),
                self.market_state.as_deref().unwrap_or("-")
            ),
        ];

        if let Some(time) = self
            .regular_market_time
            .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        {
            lines.push(format!("As of {}", time.format("%Y-%m-%d %H:%M UTC")));
        }

        lines.join("\n")
    }
}

/// Render a numeric field with two decimals, or `-` when absent
#[must_use]
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Company search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exch: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Source of market quotes
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Fetch a normalized quote for a canonical symbol
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when the provider has no record for
    /// the symbol, and a transport or payload error otherwise
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Search instruments by free text
    ///
    /// # Errors
    ///
    /// Returns error on transport or payload failure
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>>;
}

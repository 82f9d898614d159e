//! Yahoo Finance quote and search client
//!
//! Uses the v7 `quote` endpoint for prices and the v1 `search` endpoint for
//! company lookup. Only the fields projected into [`Quote`] are modeled; the
//! rest of the payload is ignored by serde.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Quote, QuoteProvider, SearchItem};
use crate::{Error, Result};

/// Default v7 quote endpoint (symbol appended)
pub const DEFAULT_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote?symbols=";

/// Default v1 search endpoint (query appended)
pub const DEFAULT_SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search?q=";

/// Yahoo rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0";

/// v7 quote response wrapper
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    #[serde(default)]
    pub quote_response: Option<YahooQuoteResult>,
}

/// Result container of the v7 response
#[derive(Debug, Default, Deserialize)]
pub struct YahooQuoteResult {
    #[serde(default)]
    pub result: Vec<YahooQuote>,
}

/// Individual v7 quote record
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuote {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub full_exchange_name: Option<String>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub regular_market_time: Option<i64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
}

/// v1 search response
#[derive(Debug, Default, Deserialize)]
pub struct YahooSearchResponse {
    #[serde(default)]
    pub quotes: Vec<YahooSearchQuote>,
}

/// Individual v1 search hit
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSearchQuote {
    pub symbol: Option<String>,
    pub shortname: Option<String>,
    pub longname: Option<String>,
    pub exch_disp: Option<String>,
    pub quote_type: Option<String>,
}

impl From<YahooSearchQuote> for SearchItem {
    fn from(hit: YahooSearchQuote) -> Self {
        Self {
            symbol: hit.symbol,
            shortname: hit.shortname,
            longname: hit.longname,
            exch: hit.exch_disp,
            kind: hit.quote_type,
        }
    }
}

/// Project the first result record of a v7 response into a [`Quote`]
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the response carries no result record
pub fn normalize(raw: YahooQuoteResponse, requested: &str) -> Result<Quote> {
    let record = raw
        .quote_response
        .and_then(|r| r.result.into_iter().next())
        .ok_or_else(|| Error::NotFound(requested.to_string()))?;

    Ok(Quote {
        symbol: record
            .symbol
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| requested.to_string()),
        short_name: record.short_name,
        long_name: record.long_name,
        exchange: record.full_exchange_name,
        currency: record.currency,
        market_state: record.market_state,
        regular_market_price: record.regular_market_price,
        regular_market_change: record.regular_market_change,
        regular_market_change_percent: record.regular_market_change_percent,
        regular_market_time: record.regular_market_time,
        previous_close: record.previous_close,
        open: record.open,
        day_low: record.day_low,
        day_high: record.day_high,
        fifty_two_week_low: record.fifty_two_week_low,
        fifty_two_week_high: record.fifty_two_week_high,
    })
}

/// Upstream Yahoo Finance client
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    quote_url: String,
    search_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_URL.to_string(), DEFAULT_SEARCH_URL.to_string())
    }
}

impl YahooClient {
    /// Create a client against the given endpoint prefixes
    ///
    /// The symbol or query is URL-encoded and appended to the prefix.
    #[must_use]
    pub fn new(quote_url: String, search_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            quote_url,
            search_url,
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}{}", self.quote_url, urlencoding::encode(symbol));
        tracing::debug!(symbol, "requesting yahoo quote");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, symbol, "yahoo quote request failed");
                e
            })?;

        let body = response.bytes().await?;
        let raw: YahooQuoteResponse = serde_json::from_slice(&body)?;

        normalize(raw, symbol)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        let url = format!("{}{}", self.search_url, urlencoding::encode(query));
        tracing::debug!(query, "requesting yahoo search");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;
        let body = response.bytes().await?;
        let raw: YahooSearchResponse = serde_json::from_slice(&body)?;

        Ok(raw.quotes.into_iter().map(SearchItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_projects_fields() {
        let json = r#"{
            "quoteResponse": {
                "result": [{
                    "symbol": "RELIANCE.NS",
                    "shortName": "RELIANCE INDUSTRIES",
                    "fullExchangeName": "NSE",
                    "exchange": "NSI",
                    "currency": "INR",
                    "marketState": "REGULAR",
                    "regularMarketPrice": 2950.1,
                    "regularMarketChange": 0,
                    "regularMarketTime": 1717401600,
                    "trailingPE": 28.4
                }],
                "error": null
            }
        }"#;
        let raw: YahooQuoteResponse = serde_json::from_str(json).unwrap();
        let quote = normalize(raw, "RELIANCE.NS").unwrap();

        assert_eq!(quote.symbol, "RELIANCE.NS");
        assert_eq!(quote.exchange.as_deref(), Some("NSE"));
        assert_eq!(quote.regular_market_change, Some(0.0));
        assert_eq!(quote.regular_market_time, Some(1_717_401_600));
        assert!(quote.regular_market_change_percent.is_none());
        assert!(quote.long_name.is_none());
    }

    #[test]
    fn test_normalize_empty_result_is_not_found() {
        let raw: YahooQuoteResponse =
            serde_json::from_str(r#"{"quoteResponse":{"result":[],"error":null}}"#).unwrap();
        let err = normalize(raw, "NOPE.NS").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref s) if s == "NOPE.NS"));
    }

    #[test]
    fn test_normalize_missing_wrapper_is_not_found() {
        let raw: YahooQuoteResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(normalize(raw, "X"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_normalize_missing_change_defaults_up() {
        let raw: YahooQuoteResponse = serde_json::from_str(
            r#"{"quoteResponse":{"result":[{"symbol":"ITC.NS","regularMarketPrice":410.0}]}}"#,
        )
        .unwrap();
        let quote = normalize(raw, "ITC.NS").unwrap();
        assert_eq!(quote.direction(), super::super::Direction::Up);
    }

    #[test]
    fn test_search_hit_mapping() {
        let raw: YahooSearchResponse = serde_json::from_str(
            r#"{"quotes":[{"symbol":"TCS.NS","shortname":"TCS","exchDisp":"NSE","quoteType":"EQUITY","score":1.0}]}"#,
        )
        .unwrap();
        let items: Vec<SearchItem> = raw.quotes.into_iter().map(SearchItem::from).collect();
        assert_eq!(items[0].exch.as_deref(), Some("NSE"));
        assert_eq!(items[0].kind.as_deref(), Some("EQUITY"));
        assert!(items[0].longname.is_none());
    }
}

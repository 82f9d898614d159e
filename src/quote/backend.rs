//! Client for a remote Rajesh quote API (`/api/quote`, `/api/search`)

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{Quote, QuoteProvider, SearchItem};
use crate::{Error, Result};

/// Error body returned by the quote API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Search response body
#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    items: Vec<SearchItem>,
}

/// Quote provider backed by another Rajesh server
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Pull the `error` message out of a failed response
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("{status}: {body}"))
}

#[async_trait]
impl QuoteProvider for BackendClient {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let response = self
            .client
            .get(format!("{}/api/quote", self.base_url))
            .query(&[("symbol", symbol)])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<Quote>().await?),
            StatusCode::NOT_FOUND => Err(Error::NotFound(symbol.to_string())),
            _ => Err(Error::Fetch(error_message(response).await)),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        let response = self
            .client
            .get(format!("{}/api/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Fetch(error_message(response).await));
        }

        let body: SearchBody = response.json().await?;
        Ok(body.items)
    }
}

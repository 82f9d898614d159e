//! Quote and search endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::Error;
use crate::quote::{Quote, SearchItem};

/// Build quote router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/quote", get(quote))
        .route("/search", get(search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub q: String,
    pub items: Vec<SearchItem>,
}

/// Latest quote for an exchange-suffixed symbol (`.NS`, `.BO`)
async fn quote(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Quote>, QuoteApiError> {
    let symbol = params.symbol.trim();
    if symbol.is_empty() {
        return Err(QuoteApiError::Missing("Missing symbol"));
    }

    state.provider.quote(symbol).await.map(Json).map_err(|e| match e {
        Error::NotFound(_) => QuoteApiError::NotFound(symbol.to_string()),
        other => {
            tracing::warn!(error = %other, symbol, "quote request failed");
            QuoteApiError::Upstream(other.to_string())
        }
    })
}

/// Company search
async fn search(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, QuoteApiError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(QuoteApiError::Missing("Missing q"));
    }

    let items = state.provider.search(q).await.map_err(|e| {
        tracing::warn!(error = %e, q, "search request failed");
        QuoteApiError::Upstream(e.to_string())
    })?;

    Ok(Json(SearchResponse {
        q: q.to_string(),
        items,
    }))
}

/// Quote API errors
#[derive(Debug)]
pub enum QuoteApiError {
    Missing(&'static str),
    NotFound(String),
    Upstream(String),
}

impl IntoResponse for QuoteApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            symbol: Option<String>,
        }

        let (status, error, symbol) = match self {
            Self::Missing(msg) => (StatusCode::BAD_REQUEST, msg.to_string(), None),
            Self::NotFound(symbol) => (
                StatusCode::NOT_FOUND,
                "Symbol not found".to_string(),
                Some(symbol),
            ),
            Self::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        (status, Json(ErrorResponse { error, symbol })).into_response()
    }
}

//! HTTP API server
//!
//! Exposes the quote provider over `/api/quote`, `/api/search` and
//! `/api/health`, and optionally serves a web UI directory at `/`.

pub mod health;
pub mod quote;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::quote::QuoteProvider;
use crate::Result;

/// State shared by the quote handlers
#[derive(Clone)]
pub struct ApiState {
    pub provider: Arc<dyn QuoteProvider>,
}

/// Builder for [`ApiServer`]
pub struct ApiServerBuilder {
    provider: Arc<dyn QuoteProvider>,
    addr: SocketAddr,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Serve `provider` on all interfaces at `port`
    #[must_use]
    pub fn new(provider: Arc<dyn QuoteProvider>, port: u16) -> Self {
        Self {
            provider,
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            static_dir: None,
        }
    }

    /// Web UI directory served at `/`, with `index.html` as the fallback page
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    #[must_use]
    pub fn build(self) -> ApiServer {
        ApiServer {
            state: Arc::new(ApiState {
                provider: self.provider,
            }),
            addr: self.addr,
            static_dir: self.static_dir,
        }
    }
}

/// Quote API server
pub struct ApiServer {
    state: Arc<ApiState>,
    addr: SocketAddr,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Full router: `/api/*`, optional static UI, CORS and request tracing
    pub fn router(&self) -> Router {
        let api = quote::router(Arc::clone(&self.state)).merge(health::router());
        let mut router = Router::new().nest("/api", api);

        if let Some(dir) = &self.static_dir {
            let ui = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            router = router.fallback_service(ui);
            tracing::info!(path = %dir.display(), "serving web UI");
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Serve until the process exits
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, letting in-flight requests finish
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(
            addr = %self.addr,
            provider = self.state.provider.name(),
            "quote API listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("quote API stopped");
        Ok(())
    }

    /// Serve on a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }
}

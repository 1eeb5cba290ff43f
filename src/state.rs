//! Shared gateway state.
//!
//! Handlers read one immutable [`GatewayState`] snapshot per request. A config
//! reload builds a fresh snapshot and swaps it in; requests already running
//! keep the snapshot they started with.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::GatewayConfig;

/// Error building the clients for a configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid backend URL: {0}")]
    BackendUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Everything a handler needs, derived from one configuration.
pub struct GatewayState {
    pub config: GatewayConfig,
    /// Client for generation calls.
    pub http: reqwest::Client,
    /// Streaming client for the API pass-through.
    pub upstream: Client<HttpConnector, Body>,
    /// Resolved backend generation endpoint.
    pub generation_url: Url,
}

impl GatewayState {
    pub fn build(config: GatewayConfig) -> Result<Self, StateError> {
        let generation_url = config
            .backend
            .endpoint(&config.generation.upstream_path, None)?;

        // The wait-time bound is enforced per call by the generation handler,
        // so the client itself only bounds connection setup.
        let http = reqwest::Client::builder()
            .connect_timeout(config.backend.connect_timeout())
            .build()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.backend.connect_timeout()));
        let upstream = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            config,
            http,
            upstream,
            generation_url,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<GatewayState>>,
}

impl AppState {
    pub fn new(state: GatewayState) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(state)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<GatewayState> {
        self.inner.load_full()
    }

    /// Apply a reloaded configuration.
    ///
    /// Only the `[backend]` section is taken from `next`; route limits and
    /// listener settings are fixed when the router is built, so differences in
    /// other sections are logged and ignored until restart.
    pub fn apply_reload(&self, next: GatewayConfig) -> Result<(), StateError> {
        let current = self.load();
        let mut merged = current.config.clone();
        merged.backend = next.backend.clone();
        if merged != next {
            tracing::warn!("Config changes outside [backend] take effect after restart");
        }
        if current.config.backend == next.backend {
            tracing::info!("Reloaded config has no backend changes");
            return Ok(());
        }

        let rebuilt = GatewayState::build(merged)?;
        tracing::info!(
            base_url = %rebuilt.config.backend.base_url,
            generation_url = %rebuilt.generation_url,
            "Backend configuration applied"
        );
        self.inner.store(Arc::new(rebuilt));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_resolves_generation_url() {
        let state = GatewayState::build(GatewayConfig::default()).unwrap();
        assert_eq!(state.generation_url.as_str(), "http://backend:3000/recipe/generate");
    }

    #[tokio::test]
    async fn reload_swaps_backend_only() {
        let app = AppState::new(GatewayState::build(GatewayConfig::default()).unwrap());

        let mut next = GatewayConfig::default();
        next.backend.base_url = "http://10.0.0.7:3000".into();
        next.generation.timeout_ms = 1_000;
        app.apply_reload(next).unwrap();

        let snapshot = app.load();
        assert_eq!(snapshot.config.backend.base_url, "http://10.0.0.7:3000");
        assert_eq!(snapshot.generation_url.as_str(), "http://10.0.0.7:3000/recipe/generate");
        assert_eq!(snapshot.config.generation.timeout_ms, 300_000);
    }

    #[tokio::test]
    async fn failed_reload_keeps_current_snapshot() {
        let app = AppState::new(GatewayState::build(GatewayConfig::default()).unwrap());

        let mut next = GatewayConfig::default();
        next.backend.base_url = "not a url".into();
        assert!(app.apply_reload(next).is_err());
        assert_eq!(app.load().config.backend.base_url, "http://backend:3000");
    }
}

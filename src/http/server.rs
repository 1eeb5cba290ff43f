//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, limits, timeouts)
//! - Give the generation route its own processing limit
//! - Apply config reloads and shut down on signal

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::HEALTH_PATH;
use crate::config::GatewayConfig;
use crate::generation::generate_recipe;
use crate::http::passthrough::passthrough_handler;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::state::{AppState, GatewayState, StateError};

/// Headroom past `generation.max_duration_secs` so the handler's own 504 is
/// written before the route limit cuts the request off.
const GENERATION_RESPONSE_MARGIN: Duration = Duration::from_secs(5);

/// Error type for server construction.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    State(#[from] StateError),
}

/// HTTP server for the recipe gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given (already validated) configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::new(GatewayState::build(config.clone())?);
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The server-wide request timeout wraps every route except generation,
    /// which carries its own longer limit. Generation buffers its body through
    /// the extractor limit so an oversized body is reported as JSON; the
    /// streamed pass-through is capped by the body limit layer instead.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let max_body = config.security.max_body_size;

        let generation_limit = config.generation.max_duration() + GENERATION_RESPONSE_MARGIN;
        let generation = Router::new()
            .route(&config.generation.path, post(generate_recipe))
            .layer(DefaultBodyLimit::max(max_body))
            .layer(TimeoutLayer::new(generation_limit));

        let mut standard = Router::new().route(HEALTH_PATH, get(health));
        if config.passthrough.enabled {
            let prefix = config.passthrough.prefix.trim_end_matches('/');
            standard = standard.route(&format!("{prefix}/{{*path}}"), any(passthrough_handler));
        }
        let standard = standard
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        generation.merge(standard).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(middleware::from_fn(record_status)),
        )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs arriving on `config_updates` are applied to the backend
    /// settings. Serving stops once `shutdown` fires; in-flight requests drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            generation_path = %self.config.generation.path,
            generation_timeout_ms = self.config.generation.timeout_ms,
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = async {
                    while let Some(next) = config_updates.recv().await {
                        if let Err(e) = state.apply_reload(next) {
                            tracing::error!(error = %e, "Failed to apply reloaded config");
                        }
                    }
                } => {}
                _ = shutdown::wait(reload_shutdown) => {}
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle to the live state, e.g. to inspect reloads.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }
}

fn make_span(request: &Request) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

async fn record_status(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_request("all", response.status().as_u16(), start);
    response
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

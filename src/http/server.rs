//! HTTP server setup and the request pipeline.
//!
//! # Responsibilities
//! - Create Axum Router with the pipeline handler
//! - Wire up middleware (request ID, tracing)
//! - Validate each request before any upstream I/O
//! - Forward admitted requests and relay the outcome
//!
//! Per request: `Received → Validated → Rejected | Forwarding → Relayed | GatewayError`.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, ProxyConfig, ValidationError};
use crate::error::ProxyError;
use crate::forward::{Forwarder, InFlightTracker, ProxyOutcome, UpstreamTarget};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::observability::metrics::{self, Outcome};
use crate::policy::{Policy, QueryParams, Verdict};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<Policy>,
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    in_flight: InFlightTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let target = UpstreamTarget::from_config(&config.upstream).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidUpstream(format!(
                "{}:{}",
                config.upstream.host, config.upstream.port
            ))])
        })?;

        let policy = Arc::new(Policy::from_config(&config.policy));
        let forwarder = Forwarder::new(target, &config.upstream, &config.timeouts);
        let in_flight = forwarder.in_flight().clone();

        let state = AppState { policy, forwarder };
        let router = Self::build_router(state);

        Ok(Self {
            router,
            config,
            in_flight,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %request_id(request),
                method = %request.method(),
                uri = %request.uri(),
            )
        });

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
                    .layer(trace)
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone())),
            )
    }

    /// Run the server until `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %format!("{}:{}", self.config.upstream.host, self.config.upstream.port),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Tracker of upstream calls in flight.
    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }
}

/// Main pipeline handler: validate, then forward.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = QueryParams::parse(request.uri().query());

    if let Verdict::Reject(rejection) = state.policy.validate(&method, &path, &query) {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            rule = rejection.kind(),
            reason = %rejection,
            "Request rejected"
        );
        metrics::record_request(method.as_str(), rejection.status().as_u16(), Outcome::Rejected, start_time);
        return ProxyError::from(rejection).into_response();
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        upstream = %state.forwarder.target(),
        "Forwarding request"
    );

    let outcome = state.forwarder.forward(request).await;
    let status = outcome.status();
    match &outcome {
        ProxyOutcome::Relayed(_) => {
            tracing::debug!(request_id = %request_id, status = %status, "Upstream response relayed");
            metrics::record_request(method.as_str(), status.as_u16(), Outcome::Relayed, start_time);
        }
        ProxyOutcome::GatewayError(err) => {
            tracing::warn!(
                request_id = %request_id,
                kind = err.kind(),
                error = %err,
                "Upstream request failed"
            );
            metrics::record_request(method.as_str(), status.as_u16(), Outcome::GatewayError, start_time);
        }
    }
    outcome.into_response()
}

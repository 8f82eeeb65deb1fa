//! Relaying admitted requests to the upstream service.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the upstream, keeping method, path+query
//!   and end-to-end headers
//! - Stream the upstream response back unchanged
//! - Turn every upstream failure into a 502 outcome
//!
//! # Design Decisions
//! - Exactly one attempt per client request; pooled connections that die
//!   before the request is written are not silently retried either
//! - The pooled client is shared by every handling task
//! - A hanging upstream is bounded by the request timeout and reported like
//!   a connection failure

use axum::body::Body;
use axum::http::{Request, Response, StatusCode, Version};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::ProxyError;
use crate::forward::headers::strip_hop_by_hop;
use crate::forward::inflight::InFlightTracker;
use crate::forward::target::UpstreamTarget;

/// Failure talking to the upstream. Always surfaced as 502.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused, reset, or not established in time.
    #[error("failed to connect to upstream {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The upstream answered with something that is not valid HTTP, or
    /// dropped the connection mid-response.
    #[error("upstream {target} failed mid-exchange: {source}")]
    Protocol {
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("upstream {target} did not respond within {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    #[error("could not build upstream request: {0}")]
    Request(#[from] axum::http::Error),
}

impl UpstreamError {
    fn from_client(target: &UpstreamTarget, source: hyper_util::client::legacy::Error) -> Self {
        let target = target.to_string();
        if source.is_connect() {
            UpstreamError::Connect { target, source }
        } else {
            UpstreamError::Protocol { target, source }
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Connect { .. } => "connect",
            UpstreamError::Protocol { .. } => "protocol",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::Request(_) => "request",
        }
    }
}

/// Result of forwarding one request.
pub enum ProxyOutcome {
    /// The upstream's response, relayed as-is.
    Relayed(Response<Body>),
    /// The upstream could not be reached or spoke garbage.
    GatewayError(UpstreamError),
}

impl ProxyOutcome {
    /// Status the client will see.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyOutcome::Relayed(response) => response.status(),
            ProxyOutcome::GatewayError(err) => err.status(),
        }
    }
}

impl IntoResponse for ProxyOutcome {
    fn into_response(self) -> axum::response::Response {
        match self {
            ProxyOutcome::Relayed(response) => response,
            ProxyOutcome::GatewayError(err) => ProxyError::from(err).into_response(),
        }
    }
}

/// Owns the connection pool to the upstream target.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    target: Arc<UpstreamTarget>,
    request_timeout: Duration,
    in_flight: InFlightTracker,
}

impl Forwarder {
    pub fn new(target: UpstreamTarget, upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(upstream.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(upstream.pool_idle_timeout_secs))
            .retry_canceled_requests(false)
            .build(connector);

        Self {
            client,
            target: Arc::new(target),
            request_timeout: timeouts.request(),
            in_flight: InFlightTracker::new(),
        }
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    /// Forward `request` to the upstream and relay whatever comes back.
    ///
    /// Dropping the returned future abandons the upstream call.
    pub async fn forward(&self, request: Request<Body>) -> ProxyOutcome {
        match self.try_forward(request).await {
            Ok(response) => ProxyOutcome::Relayed(response),
            Err(err) => ProxyOutcome::GatewayError(err),
        }
    }

    async fn try_forward(&self, request: Request<Body>) -> Result<Response<Body>, UpstreamError> {
        let (mut parts, body) = request.into_parts();
        let uri = self.target.uri_for(parts.uri.path_and_query())?;
        strip_hop_by_hop(&mut parts.headers);

        let mut upstream_request = Request::builder()
            .method(parts.method)
            .uri(uri)
            .version(Version::HTTP_11)
            .body(body)?;
        *upstream_request.headers_mut() = parts.headers;

        let guard = self.in_flight.track();
        let result = tokio::time::timeout(self.request_timeout, self.client.request(upstream_request)).await;
        guard.finish();

        let response: Response<Incoming> = match result {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(UpstreamError::from_client(&self.target, err)),
            Err(_) => {
                return Err(UpstreamError::Timeout {
                    target: self.target.to_string(),
                    timeout: self.request_timeout,
                })
            }
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

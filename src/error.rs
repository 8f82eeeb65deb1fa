//! Error taxonomy for request handling.
//!
//! Every per-request failure is classified here and mapped to the single
//! status the client sees. Nothing here is fatal to the server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::forward::UpstreamError;
use crate::http::response;
use crate::policy::Rejection;

/// Errors that end a request's handling early.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Method, path or query violates the admission policy.
    #[error("admission rejected: {0}")]
    AdmissionRejected(#[from] Rejection),

    /// Upstream refused, reset, timed out or spoke non-HTTP.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AdmissionRejected(rejection) => rejection.status(),
            ProxyError::UpstreamUnavailable(err) => err.status(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        response::status_only(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn rejections_map_to_forbidden() {
        for rejection in [
            Rejection::MethodNotAllowed(Method::POST),
            Rejection::PathNotAllowed("/solr/admin".into()),
            Rejection::BlockedParameter("qt".into()),
        ] {
            let err = ProxyError::from(rejection);
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
            assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn upstream_errors_map_to_bad_gateway() {
        let err = ProxyError::from(UpstreamError::Timeout {
            target: "localhost:8080".into(),
            timeout: std::time::Duration::from_secs(1),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("localhost:8080"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}

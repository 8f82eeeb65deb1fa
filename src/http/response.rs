//! Synthesized responses.
//!
//! The gateway only ever writes 403 and 502 itself. The body is the
//! status's reason phrase and carries no detail about the cause.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// A plain-text response carrying only `status`.
pub fn status_only(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        format!("{}\n", reason),
    )
        .into_response()
}

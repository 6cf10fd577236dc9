//! Request tracing middleware.
//!
//! Every request runs inside a span carrying its request id, so log lines
//! from handlers and repositories can be correlated.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest caller-supplied request id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Accepts a caller-supplied id only if it is short and printable ASCII.
fn sanitize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_REQUEST_ID_LEN
        || !trimmed.bytes().all(|b| b.is_ascii_graphic())
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Middleware that extracts or generates a request ID.
///
/// A valid `X-Request-ID` header is reused, otherwise a UUID v4 is generated.
/// The id is recorded on the request span and echoed in the response.
pub async fn trace_id(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(sanitize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let start = std::time::Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
    });

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), header_value);
    }

    response
}

//! Security headers middleware.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Environment switch for `Strict-Transport-Security`.
pub const HSTS_ENV_VAR: &str = "TB__SECURITY__HSTS_ENABLED";

fn hsts_enabled() -> bool {
    std::env::var(HSTS_ENV_VAR)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Adds the security headers to a response header map.
///
/// Render fragments are inlined by the host page, never framed.
fn apply_security_headers(headers: &mut HeaderMap, hsts: bool) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if hsts {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }
}

/// Middleware that adds security headers to all responses.
///
/// HSTS is only sent when `TB__SECURITY__HSTS_ENABLED=true`, which should be
/// set only behind TLS termination.
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    apply_security_headers(response.headers_mut(), hsts_enabled());
    response
}

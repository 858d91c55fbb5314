//! API Middleware
//!
//! Request logging with sensitive header masking.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use super::SIGNATURE_HEADER;

/// Header set by the request-id layer
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REDACTED: &str = "[REDACTED]";

/// Headers whose value never reaches the logs
const SENSITIVE_HEADERS: &[&str] = &[
    SIGNATURE_HEADER,
    "authorization",
    "client-secret",
    "cookie",
    "set-cookie",
];

/// Log-safe rendering of one header value.
///
/// Signatures keep their scheme prefix so a missing `sha256=` shows up in
/// the logs without leaking the digest.
fn masked_value(name: &str, value: &HeaderValue) -> String {
    let Ok(value) = value.to_str() else {
        return "[invalid utf8]".to_string();
    };

    if name == SIGNATURE_HEADER {
        return match value.split_once('=') {
            Some((scheme, _)) => format!("{}={}", scheme, REDACTED),
            None => REDACTED.to_string(),
        };
    }
    if SENSITIVE_HEADERS.contains(&name) {
        return REDACTED.to_string();
    }
    value.to_string()
}

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            // HeaderName is always lowercase
            let name = name.as_str();
            (name.to_string(), masked_value(name, value))
        })
        .collect()
}

/// Request logging middleware.
///
/// Rejected deliveries are logged at warn, upstream failures at error.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::debug!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        headers = ?mask_headers_for_logging(request.headers()),
        "Incoming request"
    );

    let start = Instant::now();
    let response = next.run(request).await;
    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(method = %method, uri = %uri, status = %status, duration_ms, request_id = %request_id, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(method = %method, uri = %uri, status = %status, duration_ms, request_id = %request_id, "Request rejected");
    } else {
        tracing::info!(method = %method, uri = %uri, status = %status, duration_ms, request_id = %request_id, "Request completed");
    }

    response
}

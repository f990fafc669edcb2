//! Request ID middleware for request tracing and correlation.
//!
//! Reuses the `x-request-id` set by an upstream proxy or mints a UUID v4.
//! The ID is recorded on the request span opened by `TraceLayer`, tagged on
//! the Sentry scope and echoed back in the response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that ensures every request and response carries a request ID.
///
/// A missing or non-ASCII incoming header is replaced, and the chosen value is
/// written back onto the request so handlers and inner layers see the same ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    let value = request
        .headers()
        .get(&header)
        .filter(|h| h.to_str().is_ok_and(|s| !s.is_empty()))
        .cloned()
        .unwrap_or_else(|| {
            // UUIDs are always valid header values
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });
    let request_id = value.to_str().unwrap_or_default().to_owned();

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    request.headers_mut().insert(header.clone(), value.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(header, value);
    response
}

//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per request)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (reuse or mint `x-request-id`, record it on the span)
//! 4. Security headers (CSP, frame denial, etc.)
//! 5. Session layer (tower-sessions, in-memory store)
//!
//! The API routes additionally carry a request body limit.

pub mod identity;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use identity::{OptionalUser, clear_auth_session, load_auth_session, set_auth_session};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;

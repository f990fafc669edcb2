//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (upload, generate, download)
//! GET  /pricing                - Plans and checkout buttons
//! GET  /pricing/success        - Post-checkout confirmation
//! GET  /login                  - Google sign-in
//! GET  /health                 - Liveness check
//!
//! # Relays (JSON)
//! POST /api/upload             - Store a data URL or pass a URL through
//! POST /api/age-filter         - Forward to the image-generation provider
//! POST /api/checkout           - Create a checkout with the payments provider
//! GET  /api/user               - Current visitor, or null
//!
//! # Auth
//! GET  /api/auth/login         - Redirect to the identity provider (PKCE)
//! GET  /auth/callback          - Exchange the code, then redirect to `next`
//! POST /api/auth/logout        - Sign out (JSON or 303 to /)
//! ```

pub mod age_filter;
pub mod auth;
pub mod checkout;
pub mod origin;
pub mod pages;
pub mod upload;
pub mod user;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted API request body (25 MiB).
///
/// Pages advertise 20 MB images and base64 adds a third on top.
pub const API_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Create the JSON relay routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload::upload))
        .route("/age-filter", post(age_filter::age_filter))
        .route("/checkout", post(checkout::checkout))
        .route("/user", get(user::current_user))
        .route("/auth/login", get(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(DefaultBodyLimit::max(API_BODY_LIMIT))
}

/// Create the page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/pricing", get(pages::pricing))
        .route("/pricing/success", get(pages::pricing_success))
        .route("/login", get(pages::login))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .route("/auth/callback", get(auth::callback))
        .route("/health", get(health))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check upstreams.
pub async fn health() -> &'static str {
    "ok"
}

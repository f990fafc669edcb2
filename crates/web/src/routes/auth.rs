//! Auth relay: Google OAuth through the identity provider.
//!
//! - Login: stores a PKCE verifier and redirects to the provider
//! - Callback: exchanges the code for tokens and stores them in the session
//! - Logout: revokes the provider session and clears the local one

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::DEFAULT_SITE_URL;
use crate::error::clear_sentry_user;
use crate::middleware::{clear_auth_session, load_auth_session, set_auth_session};
use crate::models::session_keys;
use crate::routes::origin::{post_login_base, request_origin, sanitize_next};
use crate::services::identity::Pkce;
use crate::state::AppState;

/// Query parameters of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// Site-relative path to land on after login.
    pub next: Option<String>,
}

/// Initiate Google OAuth login.
///
/// # Route
///
/// `GET /api/auth/login`
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let pkce = Pkce::generate();

    if let Err(e) = session
        .insert(session_keys::PKCE_VERIFIER, &pkce.verifier)
        .await
    {
        tracing::error!("Failed to store PKCE verifier in session: {}", e);
        return Redirect::to("/login?error=true").into_response();
    }

    let redirect_to = format!("{}/auth/callback", state.config().site_url());
    let auth_url = state.identity().authorize_url(&redirect_to, &pkce.challenge);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip(state, session, headers, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let failure = || Redirect::to(&format!("{}/login?error=true", request_origin(&headers)));

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth callback missing code");
        return failure().into_response();
    };

    let verifier: Option<String> = session
        .remove(session_keys::PKCE_VERIFIER)
        .await
        .ok()
        .flatten();
    let Some(verifier) = verifier else {
        tracing::warn!("OAuth callback without a pending login");
        return failure().into_response();
    };

    let auth = match state.identity().exchange_code(&code, &verifier).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return failure().into_response();
        }
    };

    if let Err(e) = set_auth_session(&session, &auth).await {
        tracing::error!("Failed to store auth session: {}", e);
        return failure().into_response();
    }

    tracing::info!("Visitor signed in");

    let base = post_login_base(
        state.config().public_site_url.as_deref(),
        DEFAULT_SITE_URL,
        &headers,
    );
    let next = sanitize_next(query.next.as_deref());
    Redirect::to(&format!("{base}{next}")).into_response()
}

/// Sign out.
///
/// Answers `{ "success": true }` to callers that prefer JSON and a
/// `303 See Other` to `/` otherwise.
///
/// # Route
///
/// `POST /api/auth/logout`
#[instrument(skip(state, session, headers))]
pub async fn logout(State(state): State<AppState>, session: Session, headers: HeaderMap) -> Response {
    if let Some(auth) = load_auth_session(&session).await
        && let Err(e) = state.identity().sign_out(&auth.access_token).await
    {
        tracing::error!("Failed to sign out upstream: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": "Failed to sign out" })),
        )
            .into_response();
    }

    if let Err(e) = clear_auth_session(&session).await {
        tracing::warn!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    if prefers_json(&headers) {
        axum::Json(json!({ "success": true })).into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

/// Whether the `Accept` header ranks JSON above HTML.
fn prefers_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let position = |needle: &str| accept.find(needle);
    match (position("application/json"), position("text/html")) {
        (Some(json), Some(html)) => json < html,
        (Some(_), None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, axum::http::HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_prefers_json() {
        assert!(prefers_json(&accept("application/json")));
        assert!(prefers_json(&accept("application/json, text/plain, */*")));
        assert!(!prefers_json(&accept("text/html,application/xhtml+xml,*/*;q=0.8")));
        assert!(!prefers_json(&accept("text/html, application/json")));
        assert!(!prefers_json(&accept("*/*")));
        assert!(!prefers_json(&HeaderMap::new()));
    }
}

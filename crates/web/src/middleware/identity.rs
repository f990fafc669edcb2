//! Identity extractor and session helpers.
//!
//! The session stores only the provider's tokens. [`OptionalUser`] turns
//! those into a user by asking the provider on every request that needs one.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::session_keys;
use crate::services::identity::{AuthSession, SessionUser};
use crate::state::AppState;

/// Extractor that optionally resolves the signed-in visitor.
///
/// Never rejects: no session, no tokens, expired tokens and provider errors
/// all yield `None`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.id),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<SessionUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };
        let Some(auth) = load_auth_session(session).await else {
            return Ok(Self(None));
        };
        if auth.is_expired() {
            tracing::debug!("Access token expired");
            return Ok(Self(None));
        }

        match state.identity().get_user(&auth.access_token).await {
            Ok(user) => {
                set_sentry_user(&user.id, user.email.as_deref());
                Ok(Self(Some(user)))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Could not resolve session user");
                Ok(Self(None))
            }
        }
    }
}

/// Read the provider tokens from the session, if any.
pub async fn load_auth_session(session: &Session) -> Option<AuthSession> {
    session
        .get(session_keys::AUTH_SESSION)
        .await
        .ok()
        .flatten()
}

/// Store provider tokens after a successful login.
///
/// The session ID is rotated so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_SESSION, auth).await
}

/// Drop everything held for this visitor (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

//! Identity provider client (GoTrue-compatible auth API).
//!
//! Uses OAuth 2.0 with PKCE, with Google as the only upstream provider.
//!
//! # OAuth Flow
//!
//! 1. Generate a [`Pkce`] pair and keep the verifier in the session
//! 2. Redirect the visitor to [`IdentityClient::authorize_url`]
//! 3. The provider redirects back with an authorization code
//! 4. Exchange code and verifier with [`IdentityClient::exchange_code`]
//! 5. Use the access token for [`IdentityClient::get_user`] and
//!    [`IdentityClient::sign_out`]

mod types;

pub use types::*;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::IdentityConfig;

/// The only OAuth provider offered on the login page.
const OAUTH_PROVIDER: &str = "google";

/// Errors that can occur when interacting with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl IdentityClient {
    /// Create a new client sharing the given HTTP connection pool.
    #[must_use]
    pub fn new(config: &IdentityConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Authorization URL that starts the Google OAuth flow.
    ///
    /// Asks Google for offline access and forces the consent screen so a
    /// refresh token is always issued.
    #[must_use]
    pub fn authorize_url(&self, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}/auth/v1/authorize?\
            provider={OAUTH_PROVIDER}&\
            redirect_to={}&\
            code_challenge={}&\
            code_challenge_method=s256&\
            access_type=offline&\
            prompt=consent",
            self.base_url,
            urlencoding::encode(redirect_to),
            urlencoding::encode(code_challenge)
        )
    }

    /// Exchange an authorization code and PKCE verifier for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects the code.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, IdentityError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=pkce", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .json(&PkceExchange {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        let response = Self::check(response).await?;
        let token: TokenResponse = response.json().await?;
        Ok(token.into())
    }

    /// Look up the user owning an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not accepted.
    pub async fn get_user(&self, access_token: &str) -> Result<SessionUser, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Revoke the session behind an access token.
    ///
    /// A token the provider no longer recognises (401, 403, 404) counts as
    /// already signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider reports any
    /// other failure.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            tracing::debug!(status = response.status().as_u16(), "Session already gone upstream");
            return Ok(());
        }

        Self::check(response).await.map(|_| ())
    }

    /// Turn a non-2xx response into `IdentityError::Api`.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(IdentityError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

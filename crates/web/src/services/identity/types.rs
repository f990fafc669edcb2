//! Types for the identity provider's auth API.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distr::Alphanumeric;
use righthair_core::UserId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of generated PKCE verifiers (RFC 7636 allows 43..=128).
const VERIFIER_LEN: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Types
// ─────────────────────────────────────────────────────────────────────────────

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    /// Secret kept in the visitor's session until the callback.
    pub verifier: String,
    /// `BASE64URL(SHA256(verifier))`, sent on the authorize redirect.
    pub challenge: String,
}

impl Pkce {
    /// Generate a fresh verifier/challenge pair.
    #[must_use]
    pub fn generate() -> Self {
        let verifier: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(VERIFIER_LEN)
            .map(char::from)
            .collect();
        let challenge = challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}

/// S256 code challenge for a verifier.
#[must_use]
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Tokens obtained from the code exchange, kept in the visitor's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for user-scoped calls.
    pub access_token: String,
    /// Refresh token issued with the access token.
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl AuthSession {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let now = chrono::Utc::now().timestamp();
            now >= self.obtained_at + expires_in - 60
        })
    }
}

/// Raw token response from the provider.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Body of the PKCE code exchange.
#[derive(Debug, Serialize)]
pub(super) struct PkceExchange<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// User Types
// ─────────────────────────────────────────────────────────────────────────────

/// The signed-in visitor as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider-issued user ID.
    pub id: UserId,
    /// Email address, when the OAuth provider shared one.
    pub email: Option<String>,
}

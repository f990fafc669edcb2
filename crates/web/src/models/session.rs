//! Session-related types.
//!
//! The session only ever holds auth state: the PKCE verifier between login
//! and callback, then the provider's tokens. The user's profile is looked up
//! from the provider on demand and never stored.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the PKCE code verifier of an in-flight login.
    pub const PKCE_VERIFIER: &str = "pkce_verifier";

    /// Key for the identity provider tokens (`AuthSession`).
    pub const AUTH_SESSION: &str = "auth_session";
}

//! Payments API client for hosted checkout sessions.

use reqwest::StatusCode;
use righthair_core::{ProductId, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::PaymentsConfig;

/// Fallback error text when the provider gives none.
const DEFAULT_ERROR: &str = "Failed to create checkout";

/// JSON pointers tried, in order, for the hosted checkout URL.
const REDIRECT_URL_CANDIDATES: &[&str] = &["/url", "/checkout_url", "/checkoutUrl", "/data/url"];

/// Errors that can occur when interacting with the payments API.
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// No API key configured.
    #[error("payments API key is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response. `body` is `{}` when it was not JSON.
    #[error("API error: {status}")]
    Api { status: StatusCode, body: Value },

    /// API answered 2xx without any known redirect field, or without JSON.
    #[error("Checkout response is missing a redirect URL")]
    MissingRedirectUrl { body: Value },
}

impl PaymentsError {
    /// Error text for a failed checkout: the provider's `error`, else its
    /// `message`, else a generic message.
    #[must_use]
    pub fn upstream_message(body: &Value) -> Value {
        ["error", "message"]
            .into_iter()
            .filter_map(|key| body.get(key))
            .find(|value| is_truthy(value))
            .cloned()
            .unwrap_or_else(|| json!(DEFAULT_ERROR))
    }
}

/// Identity attached to a checkout when the visitor is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutMetadata {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Checkout creation payload. Unset optional fields are left out of the
/// JSON entirely.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckout {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    /// Forwarded as the caller sent it.
    pub units: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CheckoutMetadata>,
}

impl CreateCheckout {
    /// A single-unit checkout for a product with no optional fields.
    #[must_use]
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            success_url: None,
            units: json!(1),
            discount_code: None,
            request_id: None,
            metadata: None,
        }
    }
}

/// Payments API client.
#[derive(Clone)]
pub struct PaymentsClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<SecretString>,
}

impl PaymentsClient {
    /// Create a new client sharing the given HTTP connection pool.
    #[must_use]
    pub fn new(config: &PaymentsConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Create a hosted checkout and return the URL to send the buyer to.
    ///
    /// # Errors
    ///
    /// Returns `PaymentsError::NotConfigured` without calling out when no key
    /// is set, `PaymentsError::Api` for non-2xx responses and
    /// `PaymentsError::MissingRedirectUrl` when no known URL field is present.
    pub async fn create_checkout(&self, checkout: &CreateCheckout) -> Result<String, PaymentsError> {
        let api_key = self.api_key.as_ref().ok_or(PaymentsError::NotConfigured)?;

        let response = self
            .client
            .post(format!("{}/v1/checkouts", self.api_base))
            .header("x-api-key", api_key.expose_secret())
            .json(checkout)
            .send()
            .await?;
        let status = response.status();

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({}));

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Checkout creation failed");
            return Err(PaymentsError::Api { status, body });
        }

        match redirect_url(&body) {
            Some(url) => Ok(url.to_owned()),
            None => Err(PaymentsError::MissingRedirectUrl { body }),
        }
    }
}

/// First non-empty redirect URL among the known response shapes.
fn redirect_url(body: &Value) -> Option<&str> {
    REDIRECT_URL_CANDIDATES
        .iter()
        .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
        .find(|url| !url.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Image generation API client.
//!
//! Sends one generation request per call with the caller's image and a
//! prompt derived from the target age, and returns the URL of the first
//! generated image.

use reqwest::StatusCode;
use righthair_core::TargetAge;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ImageGenConfig;

/// Model used for age transformation.
pub const MODEL: &str = "doubao-seedream-4-5-251128";

/// Output resolution requested from the provider.
const OUTPUT_SIZE: &str = "2K";

/// Errors that can occur when interacting with the image generation API.
#[derive(Debug, Error)]
pub enum ImageGenError {
    /// No credential configured.
    #[error("image generation credential is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response.
    #[error("API error: {status} - {body}")]
    Api { status: StatusCode, body: String },

    /// API answered 2xx without a result URL.
    #[error("No URL in response")]
    MissingUrl { data: Value },
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'static str,
    prompt: String,
    size: &'static str,
    response_format: &'static str,
    watermark: bool,
    image: &'a str,
}

/// Build the edit prompt for a target age.
#[must_use]
pub fn prompt_for(age: &TargetAge) -> String {
    format!(
        "Change the person to {age} years old, keeping the same outfit but in an age-appropriate style"
    )
}

/// Image generation API client.
#[derive(Clone)]
pub struct ImageGenClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<SecretString>,
}

impl ImageGenClient {
    /// Create a new client sharing the given HTTP connection pool.
    #[must_use]
    pub fn new(config: &ImageGenConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate an aged image and return its URL.
    ///
    /// `image` is forwarded verbatim, so both public URLs and data URLs work.
    ///
    /// # Errors
    ///
    /// Returns `ImageGenError::NotConfigured` without calling out when no
    /// credential is set, `ImageGenError::Api` for non-2xx responses and
    /// `ImageGenError::MissingUrl` when the response carries no result.
    pub async fn generate(&self, image: &str, age: &TargetAge) -> Result<String, ImageGenError> {
        tracing::debug!(configured = self.is_configured(), "image generation credential");
        let api_key = self.api_key.as_ref().ok_or(ImageGenError::NotConfigured)?;

        let request = GenerationRequest {
            model: MODEL,
            prompt: prompt_for(age),
            size: OUTPUT_SIZE,
            response_format: "url",
            watermark: false,
            image,
        };

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or_default(),
                body = %body,
                "Image generation API error"
            );
            return Err(ImageGenError::Api { status, body });
        }

        let data: Value = response.json().await?;
        match first_image_url(&data) {
            Some(url) => Ok(url.to_owned()),
            None => Err(ImageGenError::MissingUrl { data }),
        }
    }
}

/// `data[0].url` from a generation response.
fn first_image_url(data: &Value) -> Option<&str> {
    data.pointer("/data/0/url").and_then(Value::as_str)
}

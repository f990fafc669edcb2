//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::services::{IdentityClient, ImageGenClient, PaymentsClient, UploadStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is immutable after
/// startup. All provider clients share one HTTP connection pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    image_gen: ImageGenClient,
    payments: PaymentsClient,
    identity: IdentityClient,
    uploads: UploadStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("RightHair/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                image_gen: ImageGenClient::new(&config.image_gen, http.clone()),
                payments: PaymentsClient::new(&config.payments, http.clone()),
                identity: IdentityClient::new(&config.identity, http),
                uploads: UploadStore::new(config.uploads_dir()),
                config,
            }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the image generation client.
    #[must_use]
    pub fn image_gen(&self) -> &ImageGenClient {
        &self.inner.image_gen
    }

    /// Get a reference to the payments client.
    #[must_use]
    pub fn payments(&self) -> &PaymentsClient {
        &self.inner.payments
    }

    /// Get a reference to the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the upload store.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }
}

//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Every relay returns `Result<T, AppError>`
//! and every error body is JSON with at least an `error` field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use righthair_core::ImageRefError;
use serde_json::{Value, json};
use thiserror::Error;

use crate::services::uploads::UploadError;
use crate::services::{ImageGenError, PaymentsError};

/// Application-level error type for the web front end.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the route's size limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// A provider credential is not configured. Holds the env var name.
    #[error("Missing {0} env")]
    MissingCredential(&'static str),

    /// Upstream provider answered with a non-2xx status; its status is
    /// forwarded together with a relay-specific body.
    #[error("Upstream error: {status}")]
    Upstream { status: StatusCode, body: Value },

    /// Upstream provider answered 2xx but without the field we need.
    #[error("Upstream response violated contract")]
    UpstreamContract { body: Value },

    /// Filesystem operation failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Outbound HTTP request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { status, .. } => *status,
            Self::UpstreamContract { .. } => StatusCode::BAD_GATEWAY,
            Self::MissingCredential(_) | Self::Io(_) | Self::Http(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body sent to the client.
    fn body(&self) -> Value {
        match self {
            Self::BadRequest(message) => json!({ "error": message }),
            Self::Upstream { body, .. } | Self::UpstreamContract { body } => body.clone(),
            Self::PayloadTooLarge
            | Self::MissingCredential(_)
            | Self::Io(_)
            | Self::Http(_)
            | Self::Internal(_) => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

impl From<ImageRefError> for AppError {
    fn from(err: ImageRefError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Decode(e) => e.into(),
            UploadError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ImageGenError> for AppError {
    fn from(err: ImageGenError) -> Self {
        match err {
            ImageGenError::NotConfigured => Self::MissingCredential("ARK_API_KEY"),
            ImageGenError::Http(e) => Self::Http(e),
            ImageGenError::Api { status, body } => Self::Upstream {
                status,
                body: json!({
                    "error": "Image generation API error",
                    "detail": body,
                    "status": status.as_u16(),
                    "statusText": status.canonical_reason().unwrap_or_default(),
                }),
            },
            ImageGenError::MissingUrl { data } => Self::UpstreamContract {
                body: json!({ "error": "No URL in response", "data": data }),
            },
        }
    }
}

impl From<PaymentsError> for AppError {
    fn from(err: PaymentsError) -> Self {
        match err {
            PaymentsError::NotConfigured => Self::MissingCredential("CREEM_API_KEY"),
            PaymentsError::Http(e) => Self::Http(e),
            PaymentsError::Api { status, body } => Self::Upstream {
                status,
                body: json!({
                    "error": PaymentsError::upstream_message(&body),
                    "detail": body,
                }),
            },
            PaymentsError::MissingRedirectUrl { body } => Self::UpstreamContract {
                body: json!({
                    "error": "Checkout response is missing a redirect URL",
                    "detail": body,
                }),
            },
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Creating checkout", Some(&[("product_id", "prod_1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("Missing productId".to_string());
        assert_eq!(err.to_string(), "Bad request: Missing productId");

        let err = AppError::MissingCredential("ARK_API_KEY");
        assert_eq!(err.to_string(), "Missing ARK_API_KEY env");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::BadRequest("test".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingCredential("CREEM_API_KEY").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: Value::Null,
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::UpstreamContract { body: Value::Null }.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_bad_request_body_carries_bare_message() {
        let (status, body) = body_json(AppError::BadRequest("Missing image data".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing image data" }));
    }

    #[tokio::test]
    async fn test_missing_credential_names_variable() {
        let (_, body) = body_json(AppError::MissingCredential("ARK_API_KEY")).await;
        assert_eq!(body, json!({ "error": "Missing ARK_API_KEY env" }));
    }

    #[tokio::test]
    async fn test_upstream_body_passes_through() {
        let upstream = json!({ "error": "Image generation API error", "status": 429 });
        let (status, body) = body_json(AppError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: upstream.clone(),
        })
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, upstream);
    }

    #[tokio::test]
    async fn test_io_error_exposes_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let (status, body) = body_json(AppError::from(io)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "read-only volume" }));
    }

    #[tokio::test]
    async fn test_image_gen_api_error_mapping() {
        let err = AppError::from(ImageGenError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "rate limited".to_string(),
        });
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            json!({
                "error": "Image generation API error",
                "detail": "rate limited",
                "status": 429,
                "statusText": "Too Many Requests"
            })
        );
    }

    #[tokio::test]
    async fn test_payments_error_mapping() {
        let err = AppError::from(PaymentsError::Api {
            status: StatusCode::NOT_FOUND,
            body: json!({"message": "Product not found"}),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"error": "Product not found", "detail": {"message": "Product not found"}})
        );

        let (status, body) =
            body_json(PaymentsError::MissingRedirectUrl { body: json!({}) }.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Checkout response is missing a redirect URL");
    }

    #[test]
    fn test_not_configured_names_variable() {
        assert_eq!(
            AppError::from(ImageGenError::NotConfigured).to_string(),
            "Missing ARK_API_KEY env"
        );
        assert_eq!(
            AppError::from(PaymentsError::NotConfigured).to_string(),
            "Missing CREEM_API_KEY env"
        );
    }
}

//! Age-filter relay.

use axum::extract::State;
use righthair_core::TargetAge;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::Json;
use crate::state::AppState;

/// Age-filter request body.
#[derive(Debug, Deserialize)]
pub struct AgeFilterRequest {
    /// Image URL or data URL, forwarded verbatim.
    #[serde(default)]
    pub image: Option<Value>,
    /// Target age as a string or number.
    #[serde(default)]
    pub age: Option<Value>,
}

/// Age-filter response body.
#[derive(Debug, Serialize)]
pub struct AgeFilterResponse {
    pub url: String,
}

/// Generate an aged version of the image.
///
/// # Route
///
/// `POST /api/age-filter`
///
/// # Errors
///
/// 400 when `image` or `age` is missing, 500 when the provider credential
/// is not configured, the provider's status on upstream failure and 502
/// when the provider answers without a result URL.
#[instrument(skip(state, request))]
pub async fn age_filter(
    State(state): State<AppState>,
    Json(request): Json<AgeFilterRequest>,
) -> Result<axum::Json<AgeFilterResponse>> {
    let image = request
        .image
        .as_ref()
        .and_then(Value::as_str)
        .filter(|image| !image.is_empty());
    let age = request
        .age
        .as_ref()
        .and_then(|age| TargetAge::from_json(age).ok());

    let (Some(image), Some(age)) = (image, age) else {
        return Err(AppError::BadRequest("Missing image or age".to_string()));
    };

    tracing::debug!(
        credential_configured = state.image_gen().is_configured(),
        "Age filter request"
    );
    add_breadcrumb("age_filter", "Requested generation", Some(&[("age", age.as_str())]));
    let url = state.image_gen().generate(image, &age).await?;
    tracing::info!(age = %age, "Generated image");

    Ok(axum::Json(AgeFilterResponse { url }))
}

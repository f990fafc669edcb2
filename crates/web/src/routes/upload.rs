//! Upload relay.
//!
//! Remote URLs pass through untouched. Data URLs are decoded into the
//! uploads directory and answered with a public URL for the stored file.

use axum::{extract::State, http::HeaderMap};
use righthair_core::{ImageRef, ImageRefError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::Result;
use crate::extract::Json;
use crate::routes::origin::public_origin;
use crate::state::AppState;

/// Upload request body.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// An http(s) URL or a base64 data URL. Any other JSON type counts as missing.
    #[serde(default)]
    pub image: Option<Value>,
}

/// Upload response body.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store an uploaded image, or pass a remote URL through.
///
/// # Route
///
/// `POST /api/upload`
///
/// # Errors
///
/// 400 for a missing, unsupported or undecodable image, 500 if the file
/// cannot be written.
#[instrument(skip(state, headers, request))]
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UploadRequest>,
) -> Result<axum::Json<UploadResponse>> {
    let image = request
        .image
        .as_ref()
        .and_then(Value::as_str)
        .ok_or(ImageRefError::Missing)?;

    let url = match ImageRef::parse(image)? {
        ImageRef::Remote(url) => url,
        ImageRef::Inline(data) => {
            let file_name = state.uploads().save(&data).await?;
            format!("{}/uploads/{file_name}", public_origin(&headers))
        }
    };

    Ok(axum::Json(UploadResponse { url }))
}

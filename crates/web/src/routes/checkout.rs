//! Checkout relay.

use axum::extract::State;
use righthair_core::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{LenientJson, lenient_string};
use crate::middleware::load_auth_session;
use crate::services::payments::{CheckoutMetadata, CreateCheckout};
use crate::state::AppState;

/// Checkout request body. A body that does not parse is treated as empty.
///
/// A string field holding another JSON type reads as absent. `units` is
/// forwarded as sent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub success_url: Option<String>,
    #[serde(default)]
    pub units: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub discount_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub request_id: Option<String>,
}

/// Checkout response body.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a hosted checkout session and return its URL.
///
/// # Route
///
/// `POST /api/checkout`
///
/// # Errors
///
/// 400 without a `productId`, 500 when the API key is not configured, the
/// provider's status on upstream failure and 502 when the provider answers
/// without a redirect URL.
#[instrument(skip(state, session, request))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    LenientJson(request): LenientJson<CheckoutRequest>,
) -> Result<axum::Json<CheckoutResponse>> {
    let product_id = request
        .product_id
        .map(ProductId::new)
        .filter(|id| !id.is_blank())
        .ok_or_else(|| AppError::BadRequest("Missing productId".to_string()))?;

    if !state.payments().is_configured() {
        return Err(AppError::MissingCredential("CREEM_API_KEY"));
    }

    add_breadcrumb("checkout", "Creating checkout", Some(&[("product_id", product_id.as_str())]));

    let checkout = CreateCheckout {
        product_id,
        success_url: request.success_url,
        units: request.units.unwrap_or_else(|| json!(1)),
        discount_code: request.discount_code,
        request_id: request.request_id,
        metadata: checkout_metadata(&state, &session).await,
    };

    let url = state.payments().create_checkout(&checkout).await?;
    tracing::info!(
        product_id = %checkout.product_id,
        signed_in = checkout.metadata.is_some(),
        "Checkout created"
    );

    Ok(axum::Json(CheckoutResponse { url }))
}

/// Identity of the signed-in visitor, if it can be resolved.
async fn checkout_metadata(state: &AppState, session: &Session) -> Option<CheckoutMetadata> {
    let auth = load_auth_session(session).await?;
    if auth.is_expired() {
        tracing::debug!("Anonymous checkout, access token expired");
        return None;
    }

    match state.identity().get_user(&auth.access_token).await {
        Ok(user) => Some(CheckoutMetadata {
            user_id: user.id,
            email: user.email,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "Anonymous checkout, identity lookup failed");
            None
        }
    }
}

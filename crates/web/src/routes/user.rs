//! Current-user relay.

use axum::Json;
use serde::Serialize;
use tracing::instrument;

use crate::middleware::OptionalUser;
use crate::services::identity::SessionUser;

/// Response body for `GET /api/user`.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Option<SessionUser>,
}

/// Report the signed-in visitor, or `null`.
///
/// # Route
///
/// `GET /api/user`
#[instrument(skip_all)]
pub async fn current_user(OptionalUser(user): OptionalUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}

//! Session endpoints

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::session::SessionSnapshot;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub storefront: Option<String>,
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// POST /api/session/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.sign_in(&request.user_id).await?))
}

/// POST /api/session/sign-out
pub async fn sign_out(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.sign_out().await?))
}

/// POST /api/session/link
pub async fn link_account(
    State(state): State<AppState>,
    Json(request): Json<LinkRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.link_account(request.storefront).await?))
}

/// POST /api/session/authorization-revoked
pub async fn authorization_revoked(
    State(state): State<AppState>,
) -> ApiResult<Json<SessionSnapshot>> {
    Ok(Json(state.session.authorization_revoked().await?))
}

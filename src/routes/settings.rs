//! Provider-credential settings routes.
//!
//! Credentials are never echoed back in full: responses carry a masked view
//! plus an `enabled` flag per provider.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::SettingsStore;
use crate::error::ServerError;
use crate::schemas::settings::{SettingsResponse, SettingsUpdate};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_settings, update_settings),
    components(schemas(SettingsUpdate, SettingsResponse))
)]
pub struct SettingsApi;

/// Register settings routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).patch(update_settings))
}

/// Fetch the masked settings view (`GET /api/settings`).
///
/// The singleton row is created on first access.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Masked settings", body = SettingsResponse),
    )
)]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, ServerError> {
    let settings = state.store.fetch_or_create_settings().await?;
    Ok(Json(settings.to_response()))
}

/// Apply a partial settings update (`PATCH /api/settings`).
///
/// Absent fields are untouched; an explicit empty string clears a credential.
#[utoipa::path(
    patch,
    path = "/api/settings",
    tag = "settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Masked settings after the update", body = SettingsResponse),
    )
)]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, ServerError> {
    let settings = state.store.update_settings(req.into()).await?;
    Ok(Json(settings.to_response()))
}

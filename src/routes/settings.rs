// src/routes/settings.rs

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::internal_error;
use crate::models::{Settings, SettingsPatch};
use crate::AppState;

type RouteError = (StatusCode, String);

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, RouteError> {
    let settings = crate::settings::get_settings(state.store.as_ref())
        .await
        .map_err(internal_error)?;
    Ok(Json(settings))
}

/// PUT with a partial document; only the provided top-level keys change.
pub async fn put_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, RouteError> {
    let merged = crate::settings::update_settings(state.store.as_ref(), patch)
        .await
        .map_err(internal_error)?;
    Ok(Json(merged))
}

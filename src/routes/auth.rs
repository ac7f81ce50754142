// src/routes/auth.rs

//! Coordinator login and push subscription. Credentials are compared as
//! plain strings against the Settings sheet, unchanged from the historical
//! deployment.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::internal_error;
use crate::models::Coordinator;
use crate::settings::{get_settings, save_settings};
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
pub struct LoginBody {
    pub name: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(b): Json<LoginBody>,
) -> Result<Json<Coordinator>, RouteError> {
    let settings = get_settings(state.store.as_ref())
        .await
        .map_err(internal_error)?;
    let found = settings
        .coordinators
        .iter()
        .find(|c| c.name == b.name && c.password == b.password);
    match found {
        Some(coordinator) => {
            info!(name = %coordinator.name, "coordinator logged in");
            Ok(Json(coordinator.sanitized()))
        }
        None => Err((StatusCode::UNAUTHORIZED, "invalid credentials".to_string())),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    pub coordinator_id: String,
    /// Empty token clears the subscription.
    pub token: String,
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(b): Json<SubscribeBody>,
) -> Result<Json<Coordinator>, RouteError> {
    let mut settings = get_settings(state.store.as_ref())
        .await
        .map_err(internal_error)?;
    let Some(coordinator) = settings
        .coordinators
        .iter_mut()
        .find(|c| c.uid == b.coordinator_id)
    else {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no coordinator with uid {}", b.coordinator_id),
        ));
    };
    coordinator.push_subscription = if b.token.is_empty() {
        None
    } else {
        Some(b.token)
    };
    let sanitized = coordinator.sanitized();
    save_settings(state.store.as_ref(), &settings)
        .await
        .map_err(internal_error)?;
    Ok(Json(sanitized))
}

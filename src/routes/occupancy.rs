// src/routes/occupancy.rs

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::internal_error;
use crate::occupancy::{compute_occupancy, locality_summary, AddressOccupancy, LocalitySummary};
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyQuery {
    pub coordinator_id: Option<String>,
}

pub async fn occupancy(
    State(state): State<AppState>,
    Query(q): Query<OccupancyQuery>,
) -> Result<Json<Vec<AddressOccupancy>>, RouteError> {
    let occ = compute_occupancy(state.store.as_ref(), q.coordinator_id.as_deref())
        .await
        .map_err(internal_error)?;
    Ok(Json(occ))
}

pub async fn occupancy_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocalitySummary>>, RouteError> {
    let occ = compute_occupancy(state.store.as_ref(), None)
        .await
        .map_err(internal_error)?;
    Ok(Json(locality_summary(&occ)))
}

// src/routes/inspections.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::{internal_error, store_error};
use crate::models::rows::{self, inspection_to_row};
use crate::models::{Deleted, Inspection};
use crate::store::sheets;
use crate::AppState;

type RouteError = (StatusCode, String);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionBody {
    pub address: String,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub coordinator_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchInspectionBody {
    pub address: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub coordinator_id: Option<String>,
    pub notes: Option<String>,
}

pub async fn list_inspections(
    State(state): State<AppState>,
) -> Result<Json<Vec<Inspection>>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::INSPECTIONS)
        .await
        .map_err(internal_error)?;
    Ok(Json(records.iter().map(rows::inspection_from_row).collect()))
}

pub async fn create_inspection(
    State(state): State<AppState>,
    Json(b): Json<CreateInspectionBody>,
) -> Result<Json<Inspection>, RouteError> {
    let inspection = Inspection {
        id: Uuid::new_v4().to_string(),
        address: b.address,
        date: b.date,
        status: b.status.unwrap_or_else(|| "planned".to_string()),
        coordinator_id: b.coordinator_id.unwrap_or_default(),
        notes: b.notes.unwrap_or_default(),
    };
    state
        .store
        .add_row(sheets::INSPECTIONS, inspection_to_row(&inspection))
        .await
        .map_err(internal_error)?;
    Ok(Json(inspection))
}

pub async fn patch_inspection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<PatchInspectionBody>,
) -> Result<Json<Inspection>, RouteError> {
    let records = state
        .store
        .get_rows(sheets::INSPECTIONS)
        .await
        .map_err(internal_error)?;
    let mut inspection = records
        .iter()
        .find(|r| r.get(rows::COL_ID).map(String::as_str) == Some(id.as_str()))
        .map(rows::inspection_from_row)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no inspection with id {id}")))?;

    if let Some(v) = b.address {
        inspection.address = v;
    }
    if let Some(v) = b.date {
        inspection.date = Some(v);
    }
    if let Some(v) = b.status {
        inspection.status = v;
    }
    if let Some(v) = b.coordinator_id {
        inspection.coordinator_id = v;
    }
    if let Some(v) = b.notes {
        inspection.notes = v;
    }
    state
        .store
        .update_row(sheets::INSPECTIONS, rows::COL_ID, &id, inspection_to_row(&inspection))
        .await
        .map_err(store_error)?;
    Ok(Json(inspection))
}

pub async fn delete_inspection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, RouteError> {
    let removed = state
        .store
        .delete_rows(sheets::INSPECTIONS, rows::COL_ID, &id)
        .await
        .map_err(internal_error)?;
    Ok(Json(Deleted { deleted: removed > 0 }))
}
